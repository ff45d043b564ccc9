//! LDBWS (Live Departure Boards Web Service) upstream.
//!
//! This module talks to the National Rail live departure board service and
//! turns its loosely-typed records into normalized JSON documents.
//!
//! Key characteristics of LDBWS:
//! - Fields are omitted rather than sent as null in many cases
//! - Service IDs are **ephemeral** - only valid while the service appears
//!   on a board
//! - Calling points are grouped in lists, one per portion of a split train

mod client;
mod endpoint;
mod error;
mod mock;
mod projection;
mod proxy;
pub mod schema;

pub use client::{BOARD_ROWS, DEFAULT_BASE_URL, LdbwsClient, LdbwsConfig};
pub use endpoint::{Endpoint, Upstream};
pub use error::UpstreamError;
pub use mock::MockLdbws;
pub use projection::{FieldSpec, NormalizedRecord, Projection, ProjectionError, project};
pub use proxy::{DEFAULT_PREFIX, ProxyClient, ProxyConfig};
