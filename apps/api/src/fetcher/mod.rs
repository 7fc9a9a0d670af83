//! Page Fetcher: retrieves raw page content with a hard timeout and a size cap.
//!
//! `PageFetcher` is the seam between the pipeline and the network. Production uses
//! `HttpPageFetcher`; tests substitute counting fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect, Client, ClientBuilder};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extract::html::safe_slice;

/// Wall-clock budget for a single page fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Raw content is cut to this many characters before extraction.
pub const MAX_RAW_CHARS: usize = 120_000;
const MAX_REDIRECTS: usize = 10;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch failed ({0})")]
    Status(u16),

    #[error("Fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u128 },
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout { .. } => AppError::Timeout(e.to_string()),
            other => AppError::Fetch(other.to_string()),
        }
    }
}

/// Raw result of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub final_url: String,
    pub raw: String,
    pub content_type: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetches `url`, failing with `FetchError::Timeout` once `timeout` elapses.
/// Expiry drops the in-flight future, which aborts the underlying request.
pub async fn fetch_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis(),
        }),
    }
}

/// `reqwest`-backed fetcher with browser-like headers.
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::from_builder(Client::builder())
    }

    fn from_builder(builder: ClientBuilder) -> Result<Self, FetchError> {
        let client = builder
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut response = self
            .client
            .get(url)
            .header(header::ACCEPT, BROWSER_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.to_ascii_lowercase().contains("text/html") {
            debug!(
                "Non-HTML content type '{content_type}' from {final_url}; passing body through"
            );
        }

        // A char is at most 4 UTF-8 bytes, so this many bytes always covers the char cap.
        let byte_budget = MAX_RAW_CHARS * 4;
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() >= byte_budget {
                debug!("Body of {final_url} exceeded {byte_budget} bytes; truncating");
                break;
            }
        }

        let raw = safe_slice(&String::from_utf8_lossy(&body), MAX_RAW_CHARS);
        info!("Fetched {url} -> {final_url} ({} chars)", raw.chars().count());

        Ok(FetchedPage {
            final_url,
            raw,
            content_type,
        })
    }
}
