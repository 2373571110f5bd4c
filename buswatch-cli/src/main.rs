//! Buswatch — live bus feed watcher CLI.
//!
//! # Usage
//!
//! ```text
//! buswatch init [--url <url>] [--route <id>] [--interval-ms <ms>] [--direct] [--force]
//! buswatch fetch [--json]
//! buswatch panel
//! buswatch watch
//! buswatch status
//! buswatch stop
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{fetch::FetchArgs, init::InitArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "buswatch",
    version,
    about = "Watch live bus positions from a transit vehicle feed",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config to ~/.buswatch/config.yaml.
    Init(InitArgs),

    /// Fetch the feed once and print the buses as a table.
    Fetch(FetchArgs),

    /// Fetch the feed once and print the rendered summary panel.
    Panel,

    /// Run the polling daemon in the foreground.
    Watch,

    /// Query the running daemon over its Unix socket.
    Status,

    /// Request graceful daemon shutdown over its Unix socket.
    Stop,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Fetch(args) => args.run(),
        Commands::Panel => commands::panel::run(),
        Commands::Watch => commands::watch::run(),
        Commands::Status => commands::status::run(),
        Commands::Stop => commands::stop::run(),
    }
}
