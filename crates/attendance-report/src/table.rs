//! Plain-text table rendering for terminal output.
//!
//! Columns are sized by display width so names in non-Latin scripts stay
//! aligned.

use unicode_width::UnicodeWidthStr;

use crate::grid::ReportGrid;

/// Gap between columns.
const COLUMN_GAP: &str = "  ";

/// Render `grid` as aligned text with a rule under the header and above the
/// footer. Cells that look numeric (including `NN%`) are right-aligned.
pub fn render_grid(grid: &ReportGrid) -> String {
    let widths = column_widths(grid);

    let mut out = String::new();
    push_line(&mut out, &grid.headers, &widths, false);
    push_rule(&mut out, &widths);
    for row in &grid.rows {
        push_line(&mut out, row, &widths, true);
    }
    if let Some(footer) = &grid.footer {
        push_rule(&mut out, &widths);
        push_line(&mut out, footer, &widths, true);
    }
    out
}

/// Pad `s` on the right to `width` display columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

/// Pad `s` on the left to `width` display columns.
pub fn pad_left(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(w)), s)
}

fn column_widths(grid: &ReportGrid) -> Vec<usize> {
    let mut widths: Vec<usize> = grid
        .headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    let body = grid.rows.iter().chain(grid.footer.iter());
    for row in body {
        for (i, cell) in row.iter().enumerate() {
            let w = UnicodeWidthStr::width(cell.as_str());
            match widths.get_mut(i) {
                Some(slot) => *slot = (*slot).max(w),
                None => widths.push(w),
            }
        }
    }
    widths
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], align_numbers: bool) {
    let rendered: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if align_numbers && looks_numeric(cell) {
                pad_left(cell, width)
            } else {
                pad_right(cell, width)
            }
        })
        .collect();
    out.push_str(rendered.join(COLUMN_GAP).trim_end());
    out.push('\n');
}

fn push_rule(out: &mut String, widths: &[usize]) {
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join(COLUMN_GAP));
    out.push('\n');
}

fn looks_numeric(cell: &str) -> bool {
    let digits = cell.strip_suffix('%').unwrap_or(cell);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
