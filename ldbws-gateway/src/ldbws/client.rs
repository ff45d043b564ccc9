//! LDBWS HTTP client.
//!
//! Queries the live departure board service directly and projects each raw
//! record into its normalized document. Handles authentication and caps the
//! number of concurrent outbound requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::Crs;

use super::endpoint::{Endpoint, Upstream};
use super::error::UpstreamError;
use super::projection::{FieldSpec, project};
use super::schema::{SERVICE_DETAILS, STATION_BOARD};

/// Default base URL for the LDBWS API.
pub const DEFAULT_BASE_URL: &str =
    "https://api1.raildata.org.uk/1010-live-departure-board-dep1_2/LDBWS";

/// API version segment of every operation path.
const API_VERSION: &str = "20220120";

/// Number of services requested for every board.
pub const BOARD_ROWS: u8 = 50;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the LDBWS client.
#[derive(Debug, Clone)]
pub struct LdbwsConfig {
    /// Access token sent in the `x-apikey` header
    pub access_token: String,
    /// Base URL for the API (defaults to production LDBWS)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LdbwsConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// LDBWS API client.
#[derive(Debug, Clone)]
pub struct LdbwsClient {
    http: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
}

impl LdbwsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LdbwsConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(&config.access_token)
            .map_err(|_| UpstreamError::NotConfigured("invalid access token format".into()))?;
        headers.insert("x-apikey", token);

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::NotConfigured(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::NotConfigured(format!(
                "invalid base URL: {}",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Get the departure board for a station.
    ///
    /// With `filter_to`, only services calling at that station are returned.
    pub async fn get_departure_board(
        &self,
        crs: &Crs,
        filter_to: Option<&Crs>,
    ) -> Result<Value, UpstreamError> {
        let url = self.operation_url("GetDepartureBoard", crs.as_str());
        self.get_record(url, &board_query(filter_to, "to")).await
    }

    /// Get the arrival board for a station.
    ///
    /// With `filter_from`, only services that called at that station are returned.
    pub async fn get_arrival_board(
        &self,
        crs: &Crs,
        filter_from: Option<&Crs>,
    ) -> Result<Value, UpstreamError> {
        let url = self.operation_url("GetArrivalBoard", crs.as_str());
        self.get_record(url, &board_query(filter_from, "from")).await
    }

    /// Get service details by ID.
    ///
    /// Service IDs are ephemeral: they are only valid while the service
    /// appears on a board. Expired IDs yield `ServiceNotFound`.
    pub async fn get_service_details(&self, service_id: &str) -> Result<Value, UpstreamError> {
        let url = self.operation_url("GetServiceDetails", service_id);
        match self.get_record(url, &[]).await {
            Ok(Value::Null) => Err(UpstreamError::ServiceNotFound),
            Err(UpstreamError::ApiError { status: 404, .. }) => Err(UpstreamError::ServiceNotFound),
            other => other,
        }
    }

    /// Build `{base}/api/{version}/{operation}/{argument}`, escaping the argument.
    fn operation_url(&self, operation: &str, argument: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", API_VERSION, operation, argument]);
        }
        url
    }

    async fn get_record(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Value, UpstreamError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| UpstreamError::NotConfigured("semaphore closed".into()))?;

        debug!(url = %url, "querying LDBWS");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(UpstreamError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

fn board_query(filter: Option<&Crs>, filter_type: &str) -> Vec<(&'static str, String)> {
    let mut query = vec![("numRows", BOARD_ROWS.to_string())];
    if let Some(filter) = filter {
        query.push(("filterCrs", filter.as_str().to_string()));
        query.push(("filterType", filter_type.to_string()));
    }
    query
}

/// Project a raw record and serialize the normalized document.
pub(crate) fn normalize(raw: &Value, fields: &[FieldSpec]) -> Result<Bytes, UpstreamError> {
    let record = project(raw, fields)?;
    serde_json::to_vec(&record)
        .map(Bytes::from)
        .map_err(|e| UpstreamError::Json {
            message: e.to_string(),
            body: None,
        })
}

#[async_trait]
impl Upstream for LdbwsClient {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Bytes, UpstreamError> {
        match endpoint {
            Endpoint::DepartureBoard { from, to } => {
                let raw = self.get_departure_board(from, to.as_ref()).await?;
                normalize(&raw, STATION_BOARD)
            }
            Endpoint::ArrivalBoard { to, from } => {
                let raw = self.get_arrival_board(to, from.as_ref()).await?;
                normalize(&raw, STATION_BOARD)
            }
            Endpoint::ServiceDetails { service_id } => {
                let raw = self.get_service_details(service_id).await?;
                normalize(&raw, SERVICE_DETAILS)
            }
        }
    }
}
