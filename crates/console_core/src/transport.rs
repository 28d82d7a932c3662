use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Mode,
    protocol::{set_mode_path, StatusSample, STATUS_PATH, VIDEO_FEED_PATH},
};
use url::Url;

use crate::error::ConsoleError;

/// Per-request timeout used by [`HttpRemoteController::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait RemoteController: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusSample, ConsoleError>;
    async fn set_mode(&self, mode: Mode) -> Result<(), ConsoleError>;
}

#[derive(Debug, Clone)]
pub struct HttpRemoteController {
    http: Client,
    base_url: Url,
}

impl HttpRemoteController {
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        Self::with_timeout(base_url, Some(DEFAULT_REQUEST_TIMEOUT))
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConsoleError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ConsoleError::ClientBuild)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Address of the MJPEG feed. The console never reads it; a viewer renders it directly.
    pub fn video_feed_url(&self) -> Result<Url, ConsoleError> {
        self.endpoint(VIDEO_FEED_PATH)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConsoleError> {
        self.base_url
            .join(path)
            .map_err(|source| ConsoleError::InvalidBaseUrl {
                raw: self.base_url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl RemoteController for HttpRemoteController {
    async fn fetch_status(&self) -> Result<StatusSample, ConsoleError> {
        let url = self.endpoint(STATUS_PATH)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ConsoleError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ConsoleError::Transport {
                url: url.to_string(),
                source,
            })?;
        let sample: StatusSample =
            serde_json::from_slice(&body).map_err(|err| ConsoleError::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        sample.validate().map_err(|err| ConsoleError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        Ok(sample)
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), ConsoleError> {
        let url = self.endpoint(&set_mode_path(mode))?;
        let response = self
            .http
            .post(url.clone())
            .send()
            .await
            .map_err(|source| ConsoleError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(())
    }
}

/// Parses the configured remote address and makes it usable as a join base, so
/// `http://host:8000/api` resolves `status` to `http://host:8000/api/status`.
fn parse_base_url(raw: &str) -> Result<Url, ConsoleError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ConsoleError::InvalidBaseUrl {
        raw: trimmed.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConsoleError::UnsupportedBaseUrl(trimmed.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
