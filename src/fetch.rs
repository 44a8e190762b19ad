//! Retrieval of stored file bytes by URL.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;

/// Transport failures raised while fetching file content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reference was not an absolute http(s) URL.
    #[error("Invalid file reference: {0}")]
    InvalidReference(String),
    /// HTTP layer failed before receiving a complete response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote responded with a non-success status.
    #[error("Unexpected response ({status}) fetching {url}")]
    UnexpectedStatus {
        /// HTTP status returned by the remote.
        status: StatusCode,
        /// URL that was requested.
        url: String,
    },
}

/// Capability that resolves a file reference to its raw bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the content behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed [`Fetcher`]; the client pool is shared across concurrent uploads.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent("doc-intake/fetch")
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Build a fetcher from the loaded configuration.
    pub fn from_config() -> Result<Self, FetchError> {
        Self::new(get_config().fetch_timeout())
    }
}

fn parse_reference(reference: &str) -> Result<Url, FetchError> {
    let url = Url::parse(reference.trim())
        .map_err(|error| FetchError::InvalidReference(format!("{reference}: {error}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidReference(format!(
            "{reference}: unsupported scheme '{other}'"
        ))),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let target = parse_reference(url)?;
        let response = self.http.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        tracing::debug!(url, bytes = body.len(), "Fetched file content");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/documents/a.txt");
                then.status(200).body("hello world");
            })
            .await;

        let bytes = fetcher()
            .fetch(&server.url("/files/documents/a.txt"))
            .await
            .expect("bytes");

        mock.assert_async().await;
        assert_eq!(bytes, b"hello world");
    }

    #[tokio::test]
    async fn surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.pdf");
                then.status(404);
            })
            .await;

        let error = fetcher()
            .fetch(&server.url("/missing.pdf"))
            .await
            .expect_err("404");
        assert!(matches!(
            error,
            FetchError::UnexpectedStatus { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn rejects_non_http_references() {
        let error = fetcher()
            .fetch("file:///etc/passwd")
            .await
            .expect_err("scheme");
        assert!(matches!(error, FetchError::InvalidReference(_)));

        let error = fetcher().fetch("not a url").await.expect_err("parse");
        assert!(matches!(error, FetchError::InvalidReference(_)));
    }
}
