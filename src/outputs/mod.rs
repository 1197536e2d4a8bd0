//! Output sinks for a finished run.
//!
//! # Submodules
//!
//! - [`report`]: writes the report text to disk and prints it to stdout
//! - [`json`]: writes the full [`crate::models::TrendRun`] as JSON (optional)

pub mod json;
pub mod report;
