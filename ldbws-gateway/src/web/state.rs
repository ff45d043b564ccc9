//! Application state for the web layer.

use std::sync::Arc;

use crate::gateway::Gateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside gateway serving every board request
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}
