//! praxis-mapper: Location Ping Broadcast Server
//!
//! Clients post their current position tagged with a sport and a user id,
//! and other clients ask for active pings near them. Each user has at most
//! one ping, and pings expire after a fixed time-to-live.
//!
//! ## Features
//!
//! - In-memory ping store with per-user replacement and lazy expiry
//! - Haversine radius queries
//! - Background sweeper that purges expired pings
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use praxis_mapper::ping::{NewPing, PingStore};
//! use std::time::Duration;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let store = PingStore::new(Duration::from_secs(300));
//! store
//!     .record(NewPing::new("u1", "run", 37.7749, -122.4194))
//!     .await
//!     .unwrap();
//!
//! let now = praxis_mapper::ping::now_millis();
//! let nearby = store.query_nearby(37.7750, -122.4194, 200.0, now).await.unwrap();
//! assert_eq!(nearby.len(), 1);
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod ping;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{distance, Coordinates};
pub use ping::{NewPing, Ping, PingStore, Sweeper};
