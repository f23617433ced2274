//! Presentation layer for tutor attendance reports.
//!
//! Builds the day-by-day grid, the compact summary layout and the screen
//! table from one set of [`TutorSummary`](attendance_core::models::TutorSummary)
//! values, and renders them as CSV, aligned text or JSON.

pub mod csv;
pub mod export;
pub mod grid;
pub mod table;
