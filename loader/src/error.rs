use reqwest::StatusCode;
use std::time::Duration;

/// The request could not be completed at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("{0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest keeps the useful part (e.g. "Connection refused") in the
        // source chain, so flatten the whole chain into the message.
        Self::Network(format!("{:#}", anyhow::Error::from(e)))
    }
}

/// Why a request ended in `LoadState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),
    #[error("HTTP error! status: {}", .status.as_u16())]
    Status { status: StatusCode, body: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
}
