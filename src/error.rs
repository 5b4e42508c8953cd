//! Process-level error type.
//!
//! Every fallible path in the binary ends in an `AppError`, which carries the
//! exit code `main` hands back to the shell:
//!
//! - `2` usage / input (incomplete selection, canceled prompt, bad flags)
//! - `3` configuration
//! - `4` prediction endpoint (transport, status, decode)
//! - `5` terminal / filesystem

use crate::config::ConfigError;
use crate::data::client::PredictionError;
use crate::domain::SelectionError;
use crate::telemetry::TelemetryError;

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_PREDICTION: u8 = 4;
pub const EXIT_IO: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<SelectionError> for AppError {
    fn from(value: SelectionError) -> Self {
        Self::new(EXIT_INPUT, value.to_string())
    }
}

impl From<PredictionError> for AppError {
    fn from(value: PredictionError) -> Self {
        Self::new(EXIT_PREDICTION, value.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::new(EXIT_CONFIG, format!("configuration error: {value}"))
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::new(EXIT_CONFIG, value.to_string())
    }
}
