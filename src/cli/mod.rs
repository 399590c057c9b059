//! Command-line interface built on clap.

use clap::{Parser, Subcommand};

/// Stormfeed - location-aware community post feed and search service
#[derive(Parser)]
#[command(name = "stormfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Check database connectivity and print basic counts
    #[command(alias = "-c", alias = "--check")]
    Check,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
