//! In-memory ping store
//!
//! Keeps at most one ping per user. Expiry is evaluated on every read, so an
//! expired ping is never returned even before the sweeper removes it.

use super::{now_millis, NewPing, Ping};
use crate::constants::messages::{INVALID_COORDINATES, MISSING_FIELDS};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Shared handle to the ping collection
///
/// Clones share the same underlying map. All mutation and iteration happens
/// under a single lock.
#[derive(Debug, Clone)]
pub struct PingStore {
    pings: Arc<RwLock<HashMap<String, Ping>>>,
    ttl_ms: i64,
}

impl PingStore {
    /// Create an empty store whose pings live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            pings: Arc::new(RwLock::new(HashMap::new())),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Time-to-live in milliseconds
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Record a ping stamped with the current time if none was given
    pub async fn record(&self, input: NewPing) -> Result<Ping> {
        self.record_at(input, now_millis()).await
    }

    /// Record a ping, replacing any previous ping from the same user
    ///
    /// # Errors
    /// `Error::Validation` if the user id or sport is missing or empty, or if
    /// either coordinate is missing. Coordinates are not range-checked.
    ///
    /// A missing or zero timestamp is replaced by `now`.
    pub async fn record_at(&self, input: NewPing, now: i64) -> Result<Ping> {
        let (user_id, sport, latitude, longitude) =
            match (input.user_id, input.sport, input.latitude, input.longitude) {
                (Some(user_id), Some(sport), Some(latitude), Some(longitude))
                    if !user_id.is_empty() && !sport.is_empty() =>
                {
                    (user_id, sport, latitude, longitude)
                }
                _ => return Err(Error::Validation(MISSING_FIELDS.to_string())),
            };

        let ping = Ping {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            sport,
            latitude,
            longitude,
            timestamp: input.timestamp.filter(|&t| t != 0).unwrap_or(now),
        };

        self.pings
            .write()
            .await
            .insert(ping.user_id.clone(), ping.clone());

        info!(
            "New ping from user {} at ({}, {})",
            ping.user_id, ping.latitude, ping.longitude
        );

        Ok(ping)
    }

    /// All pings active right now
    pub async fn list_active(&self) -> Vec<Ping> {
        self.list_active_at(now_millis()).await
    }

    /// All pings active at `now`, in no particular order
    pub async fn list_active_at(&self, now: i64) -> Vec<Ping> {
        self.pings
            .read()
            .await
            .values()
            .filter(|p| p.is_active(now, self.ttl_ms))
            .cloned()
            .collect()
    }

    /// Active pings within `radius_meters` of (`lat`, `lon`)
    ///
    /// The radius is inclusive and used as given; defaulting happens at the
    /// API boundary.
    ///
    /// # Errors
    /// `Error::Validation` if either coordinate is NaN.
    pub async fn query_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_meters: f64,
        now: i64,
    ) -> Result<Vec<Ping>> {
        if lat.is_nan() || lon.is_nan() {
            return Err(Error::Validation(INVALID_COORDINATES.to_string()));
        }

        let center = Coordinates::new(lat, lon);
        let pings = self.pings.read().await;

        Ok(pings
            .values()
            .filter(|p| p.is_active(now, self.ttl_ms))
            .filter(|p| p.coordinates().is_within(center, radius_meters))
            .cloned()
            .collect())
    }

    /// Remove the ping belonging to `user_id`
    ///
    /// Returns true if a ping was removed. Deleting an unknown user is a no-op.
    pub async fn delete_by_user(&self, user_id: &str) -> bool {
        let removed = self.pings.write().await.remove(user_id).is_some();
        if removed {
            debug!("Removed ping for user {}", user_id);
        }
        removed
    }

    /// Physically remove every ping expired at `now`
    ///
    /// Returns the number of pings removed.
    pub async fn sweep_expired(&self, now: i64) -> usize {
        let mut pings = self.pings.write().await;
        let before = pings.len();
        pings.retain(|_, p| p.is_active(now, self.ttl_ms));
        before - pings.len()
    }

    /// Number of stored pings, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.pings.read().await.len()
    }

    /// Check if the store holds no pings at all
    pub async fn is_empty(&self) -> bool {
        self.pings.read().await.is_empty()
    }
}
