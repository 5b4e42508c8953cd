//! JSON export of a finished prediction.
//!
//! The file is self-describing: when it was produced, where the predictions
//! came from, the selection that was submitted and the per-algorithm labels.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::app::pipeline::Outcome;
use crate::domain::{FormSelection, PredictionResult, PredictionSource};
use crate::error::{AppError, EXIT_IO};

#[derive(Debug, Serialize)]
pub struct ExportFile<'a> {
    /// RFC 3339 with the local offset.
    pub generated_at: DateTime<Local>,
    pub source: PredictionSource,
    pub selection: &'a FormSelection,
    pub predictions: &'a PredictionResult,
}

impl<'a> ExportFile<'a> {
    pub fn new(outcome: &'a Outcome, generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            source: outcome.source,
            selection: &outcome.selection,
            predictions: &outcome.predictions,
        }
    }
}

/// Write the outcome to `path`, stamped with the current local time.
pub fn write_outcome_json(path: &Path, outcome: &Outcome) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ExportFile::new(outcome, Local::now()))
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}
