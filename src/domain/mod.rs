//! Domain types used throughout the form workflow.
//!
//! This module defines:
//!
//! - the form itself (`Field`, `FormDraft`, `FormSelection`)
//! - prediction outputs (`Algorithm`, `PredictionResult`, `PredictionSource`)
//! - the failure policy knob (`FallbackPolicy`)

pub mod types;

pub use types::*;
