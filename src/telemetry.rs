//! Tracing subscriber setup.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::TelemetryConfig;

/// Where log lines may go when no log file is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    /// Line-oriented commands: stderr is fine.
    Stderr,
    /// Full-screen UI: never write to the terminal being drawn on.
    Silent,
}

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    LogFile { path: String, source: std::io::Error },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{value}': unable to build EnvFilter")
            }
            TelemetryError::LogFile { path, source } => {
                write!(f, "failed to open log file '{path}': {source}")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::LogFile { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the global subscriber. Returns `false` when logging stays off.
pub fn init(config: &TelemetryConfig, console: Console) -> Result<bool, TelemetryError> {
    if config.log_file.is_none() && console == Console::Silent {
        return Ok(false);
    }

    let env_filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;
            builder
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(TelemetryError::Subscriber)?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(TelemetryError::Subscriber)?;
        }
    }

    Ok(true)
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|source| TelemetryError::EnvFilter {
            value: config.log_filter.clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_console_without_file_installs_nothing() {
        let config = TelemetryConfig {
            log_filter: "info".to_string(),
            log_file: None,
        };
        assert!(!init(&config, Console::Silent).unwrap());
    }
}
