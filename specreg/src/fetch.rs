//! Document fetching over HTTP and from the local filesystem.
//!
//! Every fetch is bounded twice: by `max_document_size` (reads stop one byte
//! past the limit, so an oversized body is detected without buffering it
//! whole) and by a per-fetch timeout. There are no retries at this layer.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::config::FetchConfig;
use crate::locator::Target;

/// User agent string identifying this resolver.
const USER_AGENT: &str = concat!("specreg/", env!("CARGO_PKG_VERSION"));

/// Why a document could not be fetched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Document exceeds maximum size of {0} bytes")]
    TooLarge(u64),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Raw bytes of a fetched document plus what the transport said about them.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    /// `Content-Type` header for HTTP fetches, without parameters.
    pub content_type: Option<String>,
}

/// Fetches documents for resolved targets. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_document_size: u64,
}

impl Fetcher {
    /// Create a fetcher with a shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            timeout: config.timeout(),
            max_document_size: config.max_document_size,
        })
    }

    /// Fetch the document at `target`, enforcing size and time limits.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` describing the I/O, HTTP, size, or timeout failure.
    pub async fn fetch(&self, target: &Target) -> Result<Fetched, FetchError> {
        let work = async {
            match target {
                Target::Http(url) => self.fetch_http(url).await,
                Target::File(path) => self.fetch_file(path).await,
            }
        };
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn fetch_http(&self, url: &Url) -> Result<Fetched, FetchError> {
        tracing::debug!(url = %url, "Fetching document over HTTP");
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_document_size)
        {
            return Err(FetchError::TooLarge(self.max_document_size));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase());

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (bytes.len() + chunk.len()) as u64 > self.max_document_size {
                return Err(FetchError::TooLarge(self.max_document_size));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(Fetched {
            bytes,
            content_type,
        })
    }

    async fn fetch_file(&self, path: &Path) -> Result<Fetched, FetchError> {
        tracing::debug!(path = %path.display(), "Reading document from disk");
        let file = tokio::fs::File::open(path).await?;

        // Read at most max_document_size + 1 bytes to detect oversized files
        let mut bytes = Vec::new();
        file.take(self.max_document_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .await?;

        if bytes.len() as u64 > self.max_document_size {
            return Err(FetchError::TooLarge(self.max_document_size));
        }

        Ok(Fetched {
            bytes,
            content_type: None,
        })
    }
}
