//! Centralized constants for the praxis-mapper crate

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
}

/// Validation messages returned to API clients
pub mod messages {
    pub const MISSING_FIELDS: &str = "Missing required fields";
    pub const INVALID_COORDINATES: &str = "Invalid coordinates";
}
