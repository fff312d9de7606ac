//! Imgflip catalog client.

use super::{CatalogFetcher, RawMeme};
use crate::config::DEFAULT_CATALOG_URL;
use crate::{Error, Result};
use serde::Deserialize;

/// Message used when the service reports failure without a reason.
const DEFAULT_FAILURE_MESSAGE: &str = "Failed to fetch memes";

/// Fetches the public Imgflip meme catalog.
///
/// No timeout is set: a fetch resolves whenever the service answers.
#[derive(Debug, Clone)]
pub struct ImgflipFetcher {
    /// Catalog endpoint.
    endpoint: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl ImgflipFetcher {
    /// Creates a client for the default endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_CATALOG_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sets the catalog endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Returns the catalog endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self) -> Result<String> {
        let response = self.client.get(&self.endpoint).send().await.map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_request() {
                "request"
            } else {
                "unknown"
            };
            tracing::error!(
                endpoint = %self.endpoint,
                error = %e,
                error_kind = error_kind,
                "Catalog request failed"
            );
            Error::Fetch(format!("{error_kind} error: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(endpoint = %self.endpoint, status = %status, "Catalog returned error status");
            return Err(Error::Fetch(format!("catalog returned status: {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("failed to read catalog body: {e}")))
    }
}

impl Default for ImgflipFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFetcher for ImgflipFetcher {
    async fn fetch(&self) -> Result<Vec<RawMeme>> {
        let body = self.request().await?;
        let memes = parse_catalog_response(&body)?;
        tracing::debug!(count = memes.len(), "Fetched catalog");
        Ok(memes)
    }
}

/// Envelope returned by the catalog endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    success: bool,
    #[serde(default)]
    data: Option<CatalogData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    memes: Vec<RawMeme>,
}

/// Parses a catalog response body.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the body is not a catalog envelope, if
/// `success` is false, or if a successful envelope carries no data.
pub fn parse_catalog_response(body: &str) -> Result<Vec<RawMeme>> {
    let response: CatalogResponse = serde_json::from_str(body)
        .map_err(|e| Error::Fetch(format!("invalid catalog response: {e}")))?;

    if !response.success {
        return Err(Error::Fetch(
            response
                .error_message
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        ));
    }

    response
        .data
        .map(|data| data.memes)
        .ok_or_else(|| Error::Fetch("catalog response has no data".to_string()))
}
