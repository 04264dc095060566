use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::ShortenerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ShortenError {
    #[error("shortening request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("shortening request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("provider rejected the link ({status}): {body}")]
    Provider { status: StatusCode, body: String },

    #[error("unexpected provider response: {0:?}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ShortenError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ShortenError::Timeout(e)
        } else {
            ShortenError::Request(e)
        }
    }
}

/// A link-shortening provider.
///
/// Implementations must be shareable across tasks; the dispatcher holds one
/// for the whole process.
#[async_trait]
pub trait Shortener: Send + Sync {
    /// Shorten a fully-schemed URL.
    async fn shorten(&self, url: &str) -> Result<String, ShortenError>;
}

/// Client for TinyURL's plain-text `api-create.php` endpoint.
pub struct TinyUrlClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TinyUrlClient {
    pub fn new(config: &ShortenerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the shortener")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Shortener for TinyUrlClient {
    async fn shorten(&self, url: &str) -> Result<String, ShortenError> {
        debug!("Requesting short link from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShortenError::Provider { status, body });
        }

        let body = response.text().await?;
        parse_short_url(&body)
    }
}

/// TinyURL answers with the bare short link, or the word `Error` on bad input.
fn parse_short_url(body: &str) -> Result<String, ShortenError> {
    let link = body.trim();
    let is_link = (link.starts_with("https://") || link.starts_with("http://"))
        && !link.contains(char::is_whitespace);
    if is_link {
        Ok(link.to_string())
    } else {
        Err(ShortenError::InvalidResponse(link.to_string()))
    }
}
