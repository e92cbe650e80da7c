//! Status command handler
//!
//! Queries the health endpoint of a running server.

use crate::config::Config;
use crate::error::Result;
use crate::server::routes::HealthResponse;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Server base URL (defaults to the configured address)
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let base = match args.url {
        Some(url) => url,
        None => local_base_url(&Config::load()?),
    };

    println!("praxis-mapper v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match fetch_health(&base).await {
        Ok(health) => {
            println!("Server: RUNNING on {}", base);
            println!("  Status: {}", health.status);
            println!("  Stored pings: {}", health.active_pings);
        }
        Err(e) => {
            println!("Server: NOT RUNNING on {} ({})", base, e);
        }
    }

    Ok(())
}

/// Fetch `/health` from a server at `base`
pub async fn fetch_health(base: &str) -> Result<HealthResponse> {
    let url = format!("{}/health", base.trim_end_matches('/'));
    let health = reqwest::get(&url)
        .await?
        .error_for_status()?
        .json::<HealthResponse>()
        .await?;
    Ok(health)
}

/// Base URL for reaching the configured server from this machine
///
/// A wildcard bind address is not connectable, so it maps to loopback.
fn local_base_url(config: &Config) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        host => host,
    };
    format!("http://{}:{}", host, config.server.port)
}
