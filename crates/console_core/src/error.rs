use reqwest::StatusCode;
use shared::protocol::SampleError;
use thiserror::Error;

/// How a failed request is treated by the poll loop. Both kinds skip the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Protocol,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("implausible status sample: {0}")]
    InvalidSample(#[from] SampleError),
    #[error("invalid remote base url '{raw}': {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("remote base url '{0}' must use http or https")]
    UnsupportedBaseUrl(String),
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ConsoleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConsoleError::Status { .. }
            | ConsoleError::Decode { .. }
            | ConsoleError::InvalidSample(_) => FailureKind::Protocol,
            ConsoleError::Transport { .. }
            | ConsoleError::InvalidBaseUrl { .. }
            | ConsoleError::UnsupportedBaseUrl(_)
            | ConsoleError::ClientBuild(_) => FailureKind::Transport,
        }
    }
}
