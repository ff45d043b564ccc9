//! Mock LDBWS upstream for running without API access.
//!
//! Loads raw records from JSON files and serves them as if they were live
//! API responses, through the same projection as the real client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::domain::Crs;

use super::client::normalize;
use super::endpoint::{Endpoint, Upstream};
use super::error::UpstreamError;
use super::schema::{SERVICE_DETAILS, STATION_BOARD};

/// Mock upstream that serves raw records from a directory.
///
/// Expects board files named `{CRS}.json` (e.g. `KGX.json`) and optional
/// service detail files under `services/{serviceID}.json`. Arrival boards
/// and filtered boards reuse the station's board file.
#[derive(Debug, Clone)]
pub struct MockLdbws {
    boards: Arc<HashMap<Crs, Value>>,
    services: Arc<HashMap<String, Value>>,
}

impl MockLdbws {
    /// Load mock records from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, UpstreamError> {
        let data_dir = data_dir.as_ref();

        let mut boards = HashMap::new();
        for (stem, record) in read_records(data_dir)? {
            let crs = Crs::parse(&stem).map_err(|_| {
                UpstreamError::NotConfigured(format!("invalid CRS in filename: {stem}"))
            })?;
            boards.insert(crs, record);
        }

        if boards.is_empty() {
            return Err(UpstreamError::NotConfigured(format!(
                "no mock board files found in {}",
                data_dir.display()
            )));
        }

        let services_dir = data_dir.join("services");
        let services = if services_dir.is_dir() {
            read_records(&services_dir)?.into_iter().collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            boards: Arc::new(boards),
            services: Arc::new(services),
        })
    }

    /// Stations with a mock board.
    pub fn available_stations(&self) -> Vec<Crs> {
        let mut stations: Vec<_> = self.boards.keys().copied().collect();
        stations.sort();
        stations
    }

    fn board(&self, crs: &Crs) -> Result<&Value, UpstreamError> {
        self.boards.get(crs).ok_or_else(|| UpstreamError::ApiError {
            status: 404,
            message: format!("no mock data for station {crs}"),
        })
    }
}

/// Read every `*.json` file in `dir` as `(file stem, record)`.
fn read_records(dir: &Path) -> Result<Vec<(String, Value)>, UpstreamError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        UpstreamError::NotConfigured(format!("failed to read {}: {e}", dir.display()))
    })?;

    let mut records = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| UpstreamError::NotConfigured(format!("failed to read entry: {e}")))?
            .path();

        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let json = std::fs::read_to_string(&path).map_err(|e| {
            UpstreamError::NotConfigured(format!("failed to read {}: {e}", path.display()))
        })?;
        let record = serde_json::from_str(&json).map_err(|e| UpstreamError::Json {
            message: format!("{}: {e}", path.display()),
            body: None,
        })?;

        records.push((stem.to_string(), record));
    }

    Ok(records)
}

#[async_trait]
impl Upstream for MockLdbws {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Bytes, UpstreamError> {
        match endpoint {
            Endpoint::DepartureBoard { from: crs, .. } | Endpoint::ArrivalBoard { to: crs, .. } => {
                normalize(self.board(crs)?, STATION_BOARD)
            }
            Endpoint::ServiceDetails { service_id } => {
                let record = self
                    .services
                    .get(service_id)
                    .ok_or(UpstreamError::ServiceNotFound)?;
                normalize(record, SERVICE_DETAILS)
            }
        }
    }
}
