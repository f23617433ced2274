//! Data layer for tutor attendance reports.
//!
//! Loads attendance records exported by the backend's report endpoint and
//! turns them into per-tutor summaries through a single aggregator shared by
//! every presentation path.

pub mod aggregator;
pub mod reader;
