//! Shared "submit" logic used by both CLI and TUI front-ends.
//!
//! validate draft -> one prediction call -> optional local fallback -> outcome
//!
//! The front-ends only deal with presentation (printing vs widgets).

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::data::{PredictionError, Predictor};
use crate::domain::{FallbackPolicy, FormDraft, FormSelection, PredictionResult, PredictionSource, SelectionError};
use crate::error::AppError;
use crate::scoring::fallback_prediction;

/// Everything the results view needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub selection: FormSelection,
    pub predictions: PredictionResult,
    pub source: PredictionSource,
    /// The endpoint failure that triggered the local fallback, if any.
    #[serde(skip)]
    pub failure: Option<PredictionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Caught before any request was made.
    Incomplete(SelectionError),
    /// The endpoint failed and no fallback was allowed.
    Prediction(PredictionError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Incomplete(err) => write!(f, "{err}"),
            SubmitError::Prediction(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<SelectionError> for SubmitError {
    fn from(value: SelectionError) -> Self {
        Self::Incomplete(value)
    }
}

impl From<SubmitError> for AppError {
    fn from(value: SubmitError) -> Self {
        match value {
            SubmitError::Incomplete(err) => err.into(),
            SubmitError::Prediction(err) => err.into(),
        }
    }
}

/// Validate the draft and, only if it is complete, request predictions.
pub fn submit<P: Predictor + ?Sized>(
    draft: &FormDraft,
    predictor: &P,
    fallback: FallbackPolicy,
) -> Result<Outcome, SubmitError> {
    let selection = draft.complete().inspect_err(|err| {
        info!(%err, "submission blocked: selection incomplete");
    })?;
    predict_selection(selection, predictor, fallback)
}

/// Request predictions for an already validated selection.
pub fn predict_selection<P: Predictor + ?Sized>(
    selection: FormSelection,
    predictor: &P,
    fallback: FallbackPolicy,
) -> Result<Outcome, SubmitError> {
    match predictor.predict(&selection) {
        Ok(predictions) => Ok(Outcome {
            selection,
            predictions,
            source: PredictionSource::Remote,
            failure: None,
        }),
        Err(err) => match fallback {
            FallbackPolicy::Off => {
                warn!(%err, "prediction failed");
                Err(SubmitError::Prediction(err))
            }
            FallbackPolicy::Local => {
                warn!(%err, "prediction failed; using local estimate");
                Ok(Outcome {
                    predictions: fallback_prediction(&selection),
                    selection,
                    source: PredictionSource::LocalFallback,
                    failure: Some(err),
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Failing {
        calls: Cell<usize>,
    }

    impl Predictor for Failing {
        fn predict(&self, _selection: &FormSelection) -> Result<PredictionResult, PredictionError> {
            self.calls.set(self.calls.get() + 1);
            Err(PredictionError::Status(500))
        }
    }

    fn analyst() -> FormSelection {
        FormSelection {
            experience_level: "EN".to_string(),
            employment_type: "PT".to_string(),
            job_title: "Data Analyst".to_string(),
            employee_residence: "BR".to_string(),
            remote_ratio: 0,
            company_location: "BR".to_string(),
            company_size: "S".to_string(),
        }
    }

    #[test]
    fn failure_without_fallback_surfaces_the_error() {
        let predictor = Failing { calls: Cell::new(0) };
        let err = predict_selection(analyst(), &predictor, FallbackPolicy::Off).unwrap_err();
        assert_eq!(err, SubmitError::Prediction(PredictionError::Status(500)));
        assert_eq!(predictor.calls.get(), 1);
    }

    #[test]
    fn failure_with_fallback_uses_local_estimate() {
        let predictor = Failing { calls: Cell::new(0) };
        let outcome = predict_selection(analyst(), &predictor, FallbackPolicy::Local).unwrap();
        assert_eq!(outcome.source, PredictionSource::LocalFallback);
        assert_eq!(outcome.failure, Some(PredictionError::Status(500)));
        assert!(outcome.predictions.iter().all(|(_, v)| v == "50k–100k"));
        assert_eq!(predictor.calls.get(), 1);
    }

    #[test]
    fn submit_error_maps_to_exit_codes() {
        let incomplete: AppError = SubmitError::Incomplete(SelectionError::Incomplete { missing: vec![] }).into();
        assert_eq!(incomplete.exit_code(), crate::error::EXIT_INPUT);
        let failed: AppError = SubmitError::Prediction(PredictionError::Status(502)).into();
        assert_eq!(failed.exit_code(), crate::error::EXIT_PREDICTION);
    }
}
