//! Process configuration.
//!
//! Values come from the environment, after loading an optional `.env` file.
//! Parsing goes through a key-lookup function so tests never touch the real
//! process environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::FallbackPolicy;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/prever/";
pub const DEFAULT_LOG_FILTER: &str = "info";

const ENV_ENDPOINT: &str = "SALARY_API_ENDPOINT";
/// Name used by the web front-end's build; honored when ours is unset.
const ENV_ENDPOINT_LEGACY: &str = "VITE_API_ENDPOINT";
const ENV_FALLBACK: &str = "SALARY_FALLBACK";
const ENV_TIMEOUT: &str = "SALARY_TIMEOUT_SECS";
const ENV_LOG: &str = "SALARY_LOG";
const ENV_LOG_FILE: &str = "SALARY_LOG_FILE";

/// Longest accepted request timeout (one day). reqwest adds the timeout to
/// `Instant::now()`, which overflows for very large values.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub fallback: FallbackPolicy,
    pub telemetry: TelemetryConfig,
}

/// Settings for the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    /// `None` means the request may wait forever.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Write logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `.env` + the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let endpoint = var(ENV_ENDPOINT)
            .or_else(|| var(ENV_ENDPOINT_LEGACY))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validate_endpoint(&endpoint)?;

        let fallback = match var(ENV_FALLBACK) {
            Some(raw) => FallbackPolicy::parse(&raw).ok_or(ConfigError::InvalidFallback { value: raw })?,
            None => FallbackPolicy::Off,
        };

        let timeout = match var(ENV_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs @ 1..=MAX_TIMEOUT_SECS) => Some(Duration::from_secs(secs)),
                Ok(_) | Err(_) => return Err(ConfigError::InvalidTimeout { value: raw }),
            },
            None => None,
        };

        Ok(Self {
            client: ClientConfig { endpoint, timeout },
            fallback,
            telemetry: TelemetryConfig {
                log_filter: var(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                log_file: var(ENV_LOG_FILE).map(PathBuf::from),
            },
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, endpoint: Option<&str>, fallback: Option<FallbackPolicy>) -> Result<Self, ConfigError> {
        if let Some(endpoint) = endpoint {
            validate_endpoint(endpoint)?;
            self.client.endpoint = endpoint.to_string();
        }
        if let Some(fallback) = fallback {
            self.fallback = fallback;
        }
        Ok(self)
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidEndpoint {
            value: endpoint.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEndpoint { value: String },
    InvalidFallback { value: String },
    InvalidTimeout { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEndpoint { value } => {
                write!(f, "{ENV_ENDPOINT} must be an http(s) URL (got '{value}')")
            }
            ConfigError::InvalidFallback { value } => {
                write!(f, "{ENV_FALLBACK} must be 'off' or 'local' (got '{value}')")
            }
            ConfigError::InvalidTimeout { value } => {
                write!(
                    f,
                    "{ENV_TIMEOUT} must be a number of seconds between 1 and {MAX_TIMEOUT_SECS} (got '{value}')"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.client.timeout, None);
        assert_eq!(config.fallback, FallbackPolicy::Off);
        assert_eq!(config.telemetry.log_filter, "info");
        assert_eq!(config.telemetry.log_file, None);
    }

    #[test]
    fn legacy_endpoint_is_used_when_ours_is_missing() {
        let config = load(&[(ENV_ENDPOINT_LEGACY, "https://api.example.com/prever/")]).unwrap();
        assert_eq!(config.client.endpoint, "https://api.example.com/prever/");

        let config = load(&[
            (ENV_ENDPOINT_LEGACY, "https://legacy.example.com/"),
            (ENV_ENDPOINT, "http://10.0.0.5:8000/prever/"),
        ])
        .unwrap();
        assert_eq!(config.client.endpoint, "http://10.0.0.5:8000/prever/");
    }

    #[test]
    fn parses_fallback_timeout_and_logging() {
        let config = load(&[
            (ENV_FALLBACK, "local"),
            (ENV_TIMEOUT, "15"),
            (ENV_LOG, "salary_bands=debug"),
            (ENV_LOG_FILE, "/tmp/salary.log"),
        ])
        .unwrap();
        assert_eq!(config.fallback, FallbackPolicy::Local);
        assert_eq!(config.client.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.telemetry.log_filter, "salary_bands=debug");
        assert_eq!(config.telemetry.log_file, Some(PathBuf::from("/tmp/salary.log")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[(ENV_ENDPOINT, "localhost:8000")]),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            load(&[(ENV_FALLBACK, "sometimes")]),
            Err(ConfigError::InvalidFallback { .. })
        ));
        assert!(matches!(load(&[(ENV_TIMEOUT, "0")]), Err(ConfigError::InvalidTimeout { .. })));
        assert!(matches!(load(&[(ENV_TIMEOUT, "soon")]), Err(ConfigError::InvalidTimeout { .. })));
    }

    #[test]
    fn timeout_is_capped_at_one_day() {
        let max = MAX_TIMEOUT_SECS.to_string();
        let config = load(&[(ENV_TIMEOUT, max.as_str())]).unwrap();
        assert_eq!(config.client.timeout, Some(Duration::from_secs(86_400)));

        let over = (MAX_TIMEOUT_SECS + 1).to_string();
        assert!(matches!(load(&[(ENV_TIMEOUT, over.as_str())]), Err(ConfigError::InvalidTimeout { .. })));

        let huge = u64::MAX.to_string();
        let err = load(&[(ENV_TIMEOUT, huge.as_str())]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout { value: huge.clone() });
        assert!(err.to_string().contains("between 1 and 86400"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = load(&[(ENV_FALLBACK, "off")])
            .unwrap()
            .with_overrides(Some("https://override.example.com/prever/"), Some(FallbackPolicy::Local))
            .unwrap();
        assert_eq!(config.client.endpoint, "https://override.example.com/prever/");
        assert_eq!(config.fallback, FallbackPolicy::Local);

        let err = load(&[]).unwrap().with_overrides(Some("not a url"), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }
}
