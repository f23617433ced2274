//! Calendar arithmetic shared by every attendance report path.
//!
//! All counting is done by walking the range one day at a time so leap years
//! and month lengths fall out of `chrono` rather than closed-form maths.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use regex::Regex;

use crate::error::{AttendanceError, Result};
use crate::models::DateRange;

// ── Single dates ──────────────────────────────────────────────────────────────

/// `true` iff `date` falls on a Sunday.
pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// The 1st of `year`/`month`.
pub fn first_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(AttendanceError::InvalidMonth { year, month })
}

/// The last calendar day of `year`/`month`.
pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let first = first_day_of_month(year, month)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .filter(|d| *d >= first)
        .ok_or(AttendanceError::InvalidMonth { year, month })
}

// ── Day iteration ─────────────────────────────────────────────────────────────

/// Every date in `from..=to`, ascending. Empty when `from > to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

/// Number of calendar days in `from..=to`.
pub fn count_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    days_between(from, to).count() as u32
}

/// Number of Sundays in `from..=to`.
pub fn count_sundays_between(from: NaiveDate, to: NaiveDate) -> u32 {
    days_between(from, to).filter(|d| is_sunday(*d)).count() as u32
}

// ── Month ranges ──────────────────────────────────────────────────────────────

/// Resolve a month range to `(1st of from-month, last day of to-month)`.
///
/// Fails with [`AttendanceError::InvalidRange`] when the range is inverted;
/// the bounds are never swapped.
pub fn month_range_bounds(
    from_year: i32,
    from_month: u32,
    to_year: i32,
    to_month: u32,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = first_day_of_month(from_year, from_month)?;
    let to = last_day_of_month(to_year, to_month)?;
    if from > to {
        return Err(AttendanceError::InvalidRange { from, to });
    }
    Ok((from, to))
}

/// Total calendar days from the 1st of the from-month through the last day of
/// the to-month, inclusive.
pub fn count_all_days_in_range(
    from_year: i32,
    from_month: u32,
    to_year: i32,
    to_month: u32,
) -> Result<u32> {
    let (from, to) = month_range_bounds(from_year, from_month, to_year, to_month)?;
    Ok(count_days_between(from, to))
}

/// Number of Sundays from the 1st of the from-month through the last day of
/// the to-month, inclusive.
pub fn count_sundays_in_range(
    from_year: i32,
    from_month: u32,
    to_year: i32,
    to_month: u32,
) -> Result<u32> {
    let (from, to) = month_range_bounds(from_year, from_month, to_year, to_month)?;
    Ok(count_sundays_between(from, to))
}

/// Effective `(year, month)` end of a range once future days are excluded.
///
/// When the last day of the requested to-month lies after `today` the end
/// becomes today's month; otherwise the requested end is returned unchanged.
pub fn clamp_range_to_today(
    from_year: i32,
    from_month: u32,
    to_year: i32,
    to_month: u32,
    today: NaiveDate,
) -> Result<(i32, u32)> {
    let (_, to) = month_range_bounds(from_year, from_month, to_year, to_month)?;
    if to > today {
        Ok((today.year(), today.month()))
    } else {
        Ok((to_year, to_month))
    }
}

// ── ClampedRange ──────────────────────────────────────────────────────────────

/// The concrete span of days a report covers: the requested month range with
/// its end pulled back to `today` when it reaches into the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Whether `to` was pulled back to `today`.
    pub clamped: bool,
}

impl ClampedRange {
    /// Validate `range` and clamp its end to `today`.
    ///
    /// Fails with [`AttendanceError::EmptyRange`] when the whole range lies
    /// after `today`.
    pub fn resolve(range: &DateRange, today: NaiveDate) -> Result<Self> {
        let (from, requested_to) =
            month_range_bounds(range.from_year, range.from_month, range.to_year, range.to_month)?;
        let clamped = requested_to > today;
        let to = if clamped { today } else { requested_to };
        if to < from {
            return Err(AttendanceError::EmptyRange { from, today });
        }
        Ok(Self { from, to, clamped })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        days_between(self.from, self.to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn total_days(&self) -> u32 {
        count_days_between(self.from, self.to)
    }

    pub fn sunday_count(&self) -> u32 {
        count_sundays_between(self.from, self.to)
    }

    /// Whether the effective span lies inside a single calendar month.
    pub fn is_single_month(&self) -> bool {
        self.from.year() == self.to.year() && self.from.month() == self.to.month()
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

fn month_spec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d{4})-(\d{1,2})\s*$").expect("regex is valid"))
}

/// Parse a `YYYY-MM` month argument into `(year, month)`.
pub fn parse_month_spec(s: &str) -> Result<(i32, u32)> {
    let caps = month_spec_regex()
        .captures(s)
        .ok_or_else(|| AttendanceError::InvalidMonthSpec(s.to_string()))?;
    let year: i32 = caps[1]
        .parse()
        .map_err(|_| AttendanceError::InvalidMonthSpec(s.to_string()))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| AttendanceError::InvalidMonthSpec(s.to_string()))?;
    first_day_of_month(year, month)?;
    Ok((year, month))
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AttendanceError::InvalidDate(s.to_string()))
}

/// Parse an attendance map key.
///
/// Plain ISO dates are the norm; full RFC 3339 timestamps are accepted by
/// taking their calendar date as written. Returns `None` for anything else.
pub fn parse_attendance_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(key)
        .ok()
        .map(|dt| dt.date_naive())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
