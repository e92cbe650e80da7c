//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};

/// Location ping broadcast server
#[derive(Parser)]
#[command(name = "praxis-mapper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the ping server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show the health of a running server
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}
