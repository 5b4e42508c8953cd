//! File output.

pub mod export;

pub use export::write_outcome_json;
