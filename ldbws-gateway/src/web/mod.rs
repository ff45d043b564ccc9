//! Web layer for the LDBWS gateway.
//!
//! Serves the JSON board API (at the root and under the legacy REST proxy
//! prefix) and a small HTML view rendered from the same cached documents.

mod error;
mod extract;
mod routes;
mod state;
pub mod templates;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
