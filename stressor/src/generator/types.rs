//! Generator error and outcome types

use thiserror::Error;

/// Errors that stop the generator
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid scenario weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rand::distr::weighted::Error> for GeneratorError {
    fn from(e: rand::distr::weighted::Error) -> Self {
        GeneratorError::InvalidWeights(e.to_string())
    }
}

/// What came back for one planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    /// HTTP status returned by the server
    pub status: u16,
    /// Size of the response body that was read
    pub body_bytes: u64,
}
