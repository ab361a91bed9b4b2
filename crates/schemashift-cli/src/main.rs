//! schemashift command-line tool.
//!
//! Applies ordered, reversible schema-change scripts against per-entity
//! content models in a remote space, tracking applied history remotely
//! so reruns are idempotent.

mod commands;

use clap::{Parser, Subcommand};

/// schemashift - content-model migrations
#[derive(Parser, Debug)]
#[command(name = "schemashift")]
#[command(version, about = "Schema migrations for remote content models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations up to a given step, or all pending if
    /// none is specified
    Up(commands::UpArgs),
    /// Revert migrations down to a given step, or just the last one if
    /// none is specified
    Down(commands::DownArgs),
    /// Create the reserved entity type that stores migration state
    Init(commands::InitArgs),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("schemashift=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Up(args) => commands::up(args).await,
        Command::Down(args) => commands::down(args).await,
        Command::Init(args) => commands::init(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
