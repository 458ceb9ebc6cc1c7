//! HTTP Fetcher Module
//!
//! Byte retrieval over HTTP, keyed by URL. A non-success status is a
//! distinct failure from a connection-level one: the body of an error
//! response is never surfaced as a fetched resource.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::loader::Fetch;

// == HTTP Fetcher ==
/// Fetches resources with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // == Constructors ==
    /// Wraps a caller-configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the configured request timeout.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl Fetch for HttpFetcher {
    type Key = Url;

    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        debug!(%url, "fetching resource");

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::BadResponse(status));
        }

        Ok(response.bytes().await?)
    }
}
