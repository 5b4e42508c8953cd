//! Offline salary-band estimate.
//!
//! Each selected value carries a small integer weight; the weights are summed
//! and the total is bucketed into one of six salary bands. This is the
//! explainable stand-in used when the prediction endpoint is unreachable.

pub mod band;
pub mod points;

pub use band::{SalaryBand, band_for_score};
pub use points::{FieldScore, ScoreBreakdown, breakdown, fallback_prediction, score};
