//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default ping time-to-live in milliseconds (5 minutes)
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Default interval between expiry sweeps in milliseconds (1 minute)
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Default nearby search radius in meters
pub const DEFAULT_RADIUS_METERS: f64 = 200.0;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "praxis-mapper";
