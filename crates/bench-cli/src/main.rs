//! Client API load bench CLI
//!
//! Runs the built-in load scenarios (or a JSON scenario file) against the
//! client management REST API, and can serve an in-memory simulator of
//! that API for local runs.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cmd_iterate, cmd_list, cmd_run, cmd_serve, RunArgs};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load scenario from a preset or JSON file
    Run {
        /// Scenario file path (JSON) or preset name
        scenario: String,

        /// Number of virtual users (overrides the scenario)
        #[arg(long)]
        vus: Option<u32>,

        /// Run duration such as 30s or 1m30s (overrides the scenario)
        #[arg(long, value_parser = parse_duration_arg)]
        duration: Option<Duration>,

        /// Client collection URL, e.g. http://127.0.0.1:8000/api/v1/client
        #[arg(long)]
        base_url: Option<String>,

        /// Print the metrics snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single iteration of a scenario and report its outcome
    Iterate {
        /// Scenario file path (JSON) or preset name
        scenario: String,

        /// Client collection URL
        #[arg(long)]
        base_url: Option<String>,

        /// Virtual user id (1-based)
        #[arg(long, default_value_t = 1)]
        vu: u32,

        /// Iteration id (0-based)
        #[arg(long, default_value_t = 0)]
        iteration: u64,
    },

    /// List built-in scenario presets
    List,

    /// Serve the in-memory client API simulator
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    scenarios::parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG takes precedence over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            vus,
            duration,
            base_url,
            json,
        } => {
            cmd_run(RunArgs {
                scenario,
                vus,
                duration,
                base_url,
                json,
            })
            .await?;
        }
        Commands::Iterate {
            scenario,
            base_url,
            vu,
            iteration,
        } => {
            cmd_iterate(&scenario, base_url, vu, iteration).await?;
        }
        Commands::List => {
            cmd_list()?;
        }
        Commands::Serve { bind, port } => {
            cmd_serve(bind, port).await?;
        }
    }

    Ok(())
}
