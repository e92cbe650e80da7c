//! HTTP server for praxis-mapper
//!
//! Serves the ping API and owns the expiry sweeper for the lifetime of the
//! server.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ping::{PingStore, Sweeper};
use routes::create_router;
use state::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns once Ctrl-C is received and in-flight requests have drained
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// Starts the expiry sweeper alongside the HTTP server and cancels it once
/// the server has stopped.
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = PingStore::new(config.ttl());
    let cancel = CancellationToken::new();
    let sweeper = Sweeper::spawn(store.clone(), config.sweep_interval(), cancel.clone());

    let state = Arc::new(AppState::new(config, store));
    let app = create_router(state);

    info!("Server listening on {}", listener.local_addr()?);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        error!("Expiry sweeper ended abnormally: {}", e);
    }
    info!("Server stopped");

    result.map_err(|e| Error::Server(format!("Server error: {}", e)))
}

/// Resolve when the process receives Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routes::{HealthResponse, RecordPingResponse};
    use std::time::Duration;

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, Config::default(), async move {
            let _ = rx.await;
        }));

        let client = reqwest::Client::new();
        let recorded: RecordPingResponse = client
            .post(format!("http://{}/api/pings", addr))
            .json(&serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 37.7749,
                "longitude": -122.4194
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(recorded.success);

        let health: HealthResponse = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.active_pings, 1);

        drop(client);
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server should stop after shutdown")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_timing() {
        let mut config = Config::default();
        config.pings.sweep_interval_ms = config.pings.ttl_ms + 1;

        let result = run(config).await;

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_address() {
        let mut config = Config::default();
        config.server.host = "not an address".to_string();

        let result = run(config).await;

        assert!(matches!(result, Err(Error::Server(_))));
    }
}
