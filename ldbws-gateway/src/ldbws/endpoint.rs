//! Logical upstream requests and the upstream seam.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::Crs;

use super::error::UpstreamError;

/// One logical request against the live-departure-board service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Departures from `from`, optionally only those calling at `to`.
    DepartureBoard { from: Crs, to: Option<Crs> },
    /// Arrivals at `to`, optionally only those having called at `from`.
    ArrivalBoard { to: Crs, from: Option<Crs> },
    /// Details of a service by its opaque ID.
    ServiceDetails { service_id: String },
}

impl Endpoint {
    /// The REST path serving this endpoint, e.g. `/departure-board/KGX/PAD`.
    pub fn path(&self) -> String {
        match self {
            Endpoint::DepartureBoard { from, to: None } => format!("/departure-board/{from}"),
            Endpoint::DepartureBoard { from, to: Some(to) } => {
                format!("/departure-board/{from}/{to}")
            }
            Endpoint::ArrivalBoard { to, from: None } => format!("/arrival-board/{to}"),
            Endpoint::ArrivalBoard { to, from: Some(from) } => {
                format!("/arrival-board/{to}/{from}")
            }
            Endpoint::ServiceDetails { service_id } => format!("/service-details/{service_id}"),
        }
    }

    /// The path as unescaped segments; a service ID is always one segment,
    /// whatever characters it contains.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Endpoint::DepartureBoard { from, to } => board_segments("departure-board", from, *to),
            Endpoint::ArrivalBoard { to, from } => board_segments("arrival-board", to, *from),
            Endpoint::ServiceDetails { service_id } => {
                vec!["service-details".to_string(), service_id.clone()]
            }
        }
    }

    /// Name of the remote operation this endpoint maps to.
    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::DepartureBoard { .. } => "GetDepartureBoard",
            Endpoint::ArrivalBoard { .. } => "GetArrivalBoard",
            Endpoint::ServiceDetails { .. } => "GetServiceDetails",
        }
    }
}

fn board_segments(board: &str, station: &Crs, filter: Option<Crs>) -> Vec<String> {
    let mut segments = vec![board.to_string(), station.to_string()];
    segments.extend(filter.map(|crs| crs.to_string()));
    segments
}

/// Source of normalized JSON documents.
///
/// Implementations make exactly one outbound call per `fetch` and return
/// either the serialized document or a failure; they never retry.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Bytes, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    #[test]
    fn board_paths() {
        let dep = Endpoint::DepartureBoard {
            from: crs("KGX"),
            to: None,
        };
        assert_eq!(dep.path(), "/departure-board/KGX");

        let dep_to = Endpoint::DepartureBoard {
            from: crs("KGX"),
            to: Some(crs("YRK")),
        };
        assert_eq!(dep_to.path(), "/departure-board/KGX/YRK");

        let arr_from = Endpoint::ArrivalBoard {
            to: crs("YRK"),
            from: Some(crs("KGX")),
        };
        assert_eq!(arr_from.path(), "/arrival-board/YRK/KGX");
        assert_eq!(arr_from.operation(), "GetArrivalBoard");
    }

    #[test]
    fn service_details_path_keeps_separators() {
        let details = Endpoint::ServiceDetails {
            service_id: "abc/def+123==".to_string(),
        };
        assert_eq!(details.path(), "/service-details/abc/def+123==");
        assert_eq!(details.operation(), "GetServiceDetails");
        assert_eq!(details.segments(), vec!["service-details", "abc/def+123=="]);
    }

    #[test]
    fn board_segment_lists() {
        let dep = Endpoint::DepartureBoard {
            from: crs("KGX"),
            to: None,
        };
        assert_eq!(dep.segments(), vec!["departure-board", "KGX"]);

        let arr_from = Endpoint::ArrivalBoard {
            to: crs("YRK"),
            from: Some(crs("KGX")),
        };
        assert_eq!(arr_from.segments(), vec!["arrival-board", "YRK", "KGX"]);
    }
}
