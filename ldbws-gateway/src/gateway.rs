//! Cache-aside gateway.
//!
//! Every inbound request goes through the same sequence:
//! validate station codes, look the request path up in the cache store, and
//! on a miss fetch from the upstream, store the bytes with a TTL and return
//! them. Unknown station codes are rejected before the cache or upstream is
//! touched. Failures are never cached.
//!
//! Concurrent identical misses are not coalesced: both fetch, both write,
//! and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cache::{CacheError, CacheStore, DEFAULT_TTL};
use crate::ldbws::{Endpoint, Upstream, UpstreamError};
use crate::stations::StationCodes;

/// An inbound request before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardQuery {
    /// `/departure-board/{from}[/{to}]`
    Departures { from: String, to: Option<String> },
    /// `/arrival-board/{to}[/{from}]`
    Arrivals { to: String, from: Option<String> },
    /// `/service-details/{service_id}`
    ServiceDetails { service_id: String },
}

/// Why the gateway could not serve a request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("unknown station code: {0}")]
    UnknownStation(String),

    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("cache store failure: {0}")]
    Cache(#[from] CacheError),
}

/// Orchestrates validation, the cache store and the upstream.
#[derive(Clone)]
pub struct Gateway {
    stations: StationCodes,
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn Upstream>,
    ttl: Duration,
}

impl Gateway {
    /// Create a gateway with the default 300 second TTL.
    pub fn new(
        stations: StationCodes,
        cache: Arc<dyn CacheStore>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            stations,
            cache,
            upstream,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL applied to newly cached responses.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The station allow-set.
    pub fn stations(&self) -> &StationCodes {
        &self.stations
    }

    /// Validate the station codes of a query and turn it into an upstream endpoint.
    ///
    /// Service IDs are opaque and forwarded without validation.
    pub fn resolve(&self, query: BoardQuery) -> Result<Endpoint, GatewayError> {
        let endpoint = match query {
            BoardQuery::Departures { from, to } => Endpoint::DepartureBoard {
                from: self.station(&from)?,
                to: to.map(|to| self.station(&to)).transpose()?,
            },
            BoardQuery::Arrivals { to, from } => Endpoint::ArrivalBoard {
                to: self.station(&to)?,
                from: from.map(|from| self.station(&from)).transpose()?,
            },
            BoardQuery::ServiceDetails { service_id } => Endpoint::ServiceDetails { service_id },
        };
        Ok(endpoint)
    }

    fn station(&self, code: &str) -> Result<crate::domain::Crs, GatewayError> {
        self.stations
            .resolve(code)
            .ok_or_else(|| GatewayError::UnknownStation(code.to_string()))
    }

    /// Serve a query whose request path is `key`.
    ///
    /// Returns the cached bytes verbatim on a hit. On a miss, fetches from the
    /// upstream and caches successful responses only.
    pub async fn serve(&self, key: &str, query: BoardQuery) -> Result<Bytes, GatewayError> {
        let endpoint = self.resolve(query)?;

        if let Some(cached) = self.cache.get(key).await? {
            debug!(path = key, "cache hit");
            return Ok(cached);
        }

        debug!(path = key, operation = endpoint.operation(), "cache miss, querying upstream");
        let body = self.upstream.fetch(&endpoint).await.inspect_err(|e| {
            warn!(path = key, error = %e, "upstream request failed");
        })?;

        self.cache.set(key, body.clone(), self.ttl).await?;
        debug!(path = key, ttl_secs = self.ttl.as_secs(), "cached response");

        Ok(body)
    }
}
