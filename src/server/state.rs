//! Server shared state
//!
//! Holds configuration and the ping store shared by all handlers.

use crate::config::Config;
use crate::ping::PingStore;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Active pings
    pub store: PingStore,
}

impl AppState {
    /// Create new application state around an existing store
    pub fn new(config: Config, store: PingStore) -> Self {
        Self { config, store }
    }

    /// Create state with an empty store sized from the config TTL
    pub fn from_config(config: Config) -> Self {
        let store = PingStore::new(config.ttl());
        Self::new(config, store)
    }

    /// Radius applied when a nearby query has no usable radius
    pub fn default_radius(&self) -> f64 {
        self.config.pings.default_radius_meters
    }
}
