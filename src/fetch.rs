//! Remote image download.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::validate::ValidatedUrl;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Downloads image bytes over HTTP(S).
///
/// One GET per call, no retries and no caching. The underlying client pools
/// connections, so one `Fetcher` is shared by all requests.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// A fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// A fetcher around a preconfigured client (proxies, DNS overrides).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<Bytes, FetchError> {
        let request_err = |source| FetchError::Request { url: url.to_string(), source };

        let response = self.client.get(url.as_str()).send().await.map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(request_err)?;
        debug!(%url, bytes = body.len(), "fetched image");
        Ok(body)
    }
}
