//! Text reports for the CLI: results, score breakdowns, reference tables.

pub mod format;

pub use format::{format_breakdown, format_notice, format_results, format_selection, format_tables};
