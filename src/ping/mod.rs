//! Location pings
//!
//! This module handles:
//! - The `Ping` record and its active/expired lifecycle
//! - The shared in-memory store (one ping per user)
//! - The background sweeper that purges expired pings

pub mod store;
pub mod sweeper;

pub use store::PingStore;
pub use sweeper::Sweeper;

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// A user's most recent reported location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    /// Unique identifier, generated at insert time
    pub id: String,
    pub user_id: String,
    /// Free-form sport tag
    pub sport: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds when the ping was recorded
    pub timestamp: i64,
}

impl Ping {
    /// Position of this ping
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Milliseconds elapsed between the ping and `now`
    ///
    /// Negative when the caller supplied a timestamp in the future.
    pub fn age_ms(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// A ping is active while its age is strictly below the TTL
    pub fn is_active(&self, now: i64, ttl_ms: i64) -> bool {
        self.age_ms(now) < ttl_ms
    }
}

/// Input for recording a ping
///
/// Every field is optional so that missing values surface as a validation
/// error from the store rather than as a parse failure.
#[derive(Debug, Clone, Default)]
pub struct NewPing {
    pub user_id: Option<String>,
    pub sport: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<i64>,
}

impl NewPing {
    /// Create a complete ping input with the timestamp left to the store
    pub fn new(
        user_id: impl Into<String>,
        sport: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            sport: Some(sport.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            timestamp: None,
        }
    }

    /// Set an explicit timestamp (epoch milliseconds)
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
