//! HTTP client for the salary prediction endpoint.
//!
//! One POST per call, JSON in and out:
//!
//! ```text
//! POST <endpoint>
//! { "experience_level": "SE", ..., "remote_ratio": 100, ... }
//!
//! 200 OK
//! { "previsoes": { "knn": "...", "árvore": "...", "naive_bayes": "...", "svm": "..." } }
//! ```
//!
//! No retries and no caching; a timeout is only applied when configured.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::domain::{FormSelection, PredictionResult};

/// Anything that can turn a complete selection into predictions.
///
/// The pipeline only talks to this trait; `PredictionClient` is the HTTP
/// implementation.
pub trait Predictor {
    fn predict(&self, selection: &FormSelection) -> Result<PredictionResult, PredictionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// The body was not the expected JSON shape.
    Decode(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::Transport(msg) => write!(f, "prediction request failed: {msg}"),
            PredictionError::Status(code) => write!(f, "prediction endpoint returned status {code}"),
            PredictionError::Decode(msg) => write!(f, "failed to parse prediction response: {msg}"),
        }
    }
}

impl std::error::Error for PredictionError {}

pub struct PredictionClient {
    client: Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, PredictionError> {
        // reqwest's blocking client times out after 30s unless told otherwise.
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictionError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Predictor for PredictionClient {
    fn predict(&self, selection: &FormSelection) -> Result<PredictionResult, PredictionError> {
        debug!(endpoint = %self.endpoint, ?selection, "sending prediction request");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(selection)
            .send()
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "prediction request failed");
                PredictionError::Transport(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "prediction endpoint rejected request");
            return Err(PredictionError::Status(status.as_u16()));
        }

        let body: PredictionResponse = resp
            .json()
            .map_err(|e| PredictionError::Decode(e.to_string()))?;
        let result = body.into_result()?;

        info!(status = status.as_u16(), predictions = result.len(), "prediction received");
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    previsoes: BTreeMap<String, String>,
}

impl PredictionResponse {
    fn into_result(self) -> Result<PredictionResult, PredictionError> {
        PredictionResult::from_map(self.previsoes).map_err(|missing| {
            let keys: Vec<&str> = missing.iter().map(|a| a.key()).collect();
            PredictionError::Decode(format!("missing prediction(s) for {}", keys.join(", ")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Algorithm;

    fn parse_response(body: &str) -> Result<PredictionResult, PredictionError> {
        let parsed: PredictionResponse =
            serde_json::from_str(body).map_err(|e| PredictionError::Decode(e.to_string()))?;
        parsed.into_result()
    }

    #[test]
    fn parses_the_four_predictions() {
        let body = r#"{"previsoes":{"knn":"100k–150k","árvore":"150k–200k","naive_bayes":"Erro: modelo ausente","svm":"200k–300k"}}"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.get(Algorithm::Knn), Some("100k–150k"));
        assert_eq!(result.get(Algorithm::NaiveBayes), Some("Erro: modelo ausente"));
    }

    #[test]
    fn missing_algorithm_is_a_decode_error() {
        let body = r#"{"previsoes":{"knn":"Até 50k","árvore":"Até 50k","svm":"Até 50k"}}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err, PredictionError::Decode("missing prediction(s) for naive_bayes".to_string()));
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        assert!(matches!(parse_response(r#"{"detail":"Not Found"}"#), Err(PredictionError::Decode(_))));
        assert!(matches!(
            parse_response(r#"{"previsoes":{"knn":3,"árvore":"a","naive_bayes":"b","svm":"c"}}"#),
            Err(PredictionError::Decode(_))
        ));
    }

    #[test]
    fn error_messages_name_the_failure() {
        assert_eq!(
            PredictionError::Status(503).to_string(),
            "prediction endpoint returned status 503"
        );
        assert!(PredictionError::Transport("connection refused".into())
            .to_string()
            .contains("connection refused"));
    }
}
