//! praxis-mapper CLI entry point
//!
//! Location ping broadcast server - CLI + HTTP API

use praxis_mapper::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
