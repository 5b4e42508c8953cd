//! Reference data and the remote prediction endpoint.

pub mod client;
pub mod tables;

pub use client::{PredictionClient, PredictionError, Predictor};
