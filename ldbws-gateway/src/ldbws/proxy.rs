//! Client for an already-normalizing REST proxy.
//!
//! In proxy mode the gateway does not talk to LDBWS itself: it forwards the
//! canonical path to another instance exposing the same JSON API and passes
//! the response bytes through untouched.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use super::endpoint::{Endpoint, Upstream};
use super::error::UpstreamError;

/// Path prefix under which REST proxies expose the API.
pub const DEFAULT_PREFIX: &str = "/ldbws-rest-proxy/v0.1";

/// Configuration for the proxy client.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL including the API prefix, e.g. `http://proxy:5000/ldbws-rest-proxy/v0.1`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProxyConfig {
    /// Config for a proxy reachable at `host` (`name` or `name:port`) over plain HTTP.
    pub fn for_host(host: &str) -> Self {
        Self::new(format!("http://{host}{DEFAULT_PREFIX}"))
    }

    /// Config for a proxy at an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 5,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Forwards requests to a REST proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a new proxy client.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::NotConfigured(format!("invalid proxy URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::NotConfigured(format!(
                "invalid proxy URL: {}",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The URL a given endpoint is forwarded to.
    ///
    /// Each segment is percent-encoded, so a service ID containing `/`, `?`
    /// or `#` stays a single segment.
    pub fn url_for(&self, endpoint: &Endpoint) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(endpoint.segments());
        }
        url
    }
}

#[async_trait]
impl Upstream for ProxyClient {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Bytes, UpstreamError> {
        let url = self.url_for(endpoint);
        debug!(url = %url, "querying REST proxy");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.bytes().await?)
    }
}
