//! Core types and calendar arithmetic for tutor attendance reporting.
//!
//! Holds the record/summary models, the Sunday-aware day counting used by
//! every report path, the shared error type, display formatting helpers,
//! timezone utilities and the CLI settings layer.

pub mod calendar;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
