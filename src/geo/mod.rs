//! Great-circle distance
//!
//! Haversine distance between two points on a spherical Earth. Coordinates
//! are plain degrees and are never range-checked: out-of-range input is just
//! arithmetic.

use crate::constants::geo::EARTH_RADIUS_METERS;
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Distance to another point in meters
    pub fn distance_to(&self, other: Coordinates) -> f64 {
        distance(self.lat, self.lng, other.lat, other.lng)
    }

    /// Check if this point lies within `radius_meters` of `center` (inclusive)
    pub fn is_within(&self, center: Coordinates, radius_meters: f64) -> bool {
        self.distance_to(center) <= radius_meters
    }
}

/// Calculate the distance between two points in meters (Haversine formula)
///
/// # Arguments
/// * `lat1`, `lon1` - First point in degrees
/// * `lat2`, `lon2` - Second point in degrees
///
/// # Returns
/// Distance in meters. NaN if any input is NaN.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
