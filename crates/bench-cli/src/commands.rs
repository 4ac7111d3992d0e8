//! CLI command implementations
//!
//! Kept out of main.rs so scenario resolution can be unit tested.

use anyhow::{Context, Result};
use client_api_sim::{ClientStore, SimConfig};
use loadgen::{
    Executor, IterationContext, IterationOutcome, ReqwestTransport, RunSummary, ScenarioRunner,
};
use observability::MetricsCollector;
use scenarios::options::format_duration;
use scenarios::{Endpoint, Presets, TestScenario};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Arguments of the 'run' command
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub scenario: String,
    pub vus: Option<u32>,
    pub duration: Option<Duration>,
    pub base_url: Option<String>,
    pub json: bool,
}

/// Implementation of the 'run' command - runs a scenario until its duration elapses
pub async fn cmd_run(args: RunArgs) -> Result<()> {
    let mut scenario = resolve_scenario(&args.scenario)?;
    apply_base_url(&mut scenario, args.base_url.as_deref())?;
    if let Some(vus) = args.vus {
        scenario.options.vus = vus;
    }
    if let Some(duration) = args.duration {
        scenario.options.duration = duration;
    }
    scenario.validate()?;

    info!("Running scenario: {}", scenario.name);
    info!("  Target:   {}", scenario.endpoint);
    info!("  VUs:      {}", scenario.options.vus);
    info!("  Duration: {}", format_duration(scenario.options.duration));

    let runner = ScenarioRunner::new(
        scenario,
        ReqwestTransport::new()?,
        Arc::new(MetricsCollector::new()),
    );
    let executor = Executor::new(runner)?;

    let shutdown = CancellationToken::new();
    let interrupt = spawn_ctrl_c(shutdown.clone());
    let summary = executor.run(shutdown).await;
    interrupt.abort();
    let summary = summary?;

    if summary.cancelled {
        warn!("Run interrupted before the configured duration");
    }

    if args.json {
        println!("{}", summary.snapshot.to_json_pretty()?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Implementation of the 'iterate' command - runs one iteration without the trailing pause
pub async fn cmd_iterate(
    scenario: &str,
    base_url: Option<String>,
    vu: u32,
    iteration: u64,
) -> Result<()> {
    let mut scenario = resolve_scenario(scenario)?;
    apply_base_url(&mut scenario, base_url.as_deref())?;
    scenario.think_time = Duration::ZERO;

    let metrics = Arc::new(MetricsCollector::new());
    let runner = ScenarioRunner::new(scenario, ReqwestTransport::new()?, metrics.clone());

    let outcome = runner
        .run_iteration(IterationContext::new(vu, iteration), &CancellationToken::new())
        .await;

    match &outcome {
        IterationOutcome::Completed {
            client_id: Some(id),
        } => println!("Iteration completed (codcli {})", id),
        IterationOutcome::Completed { client_id: None } => println!("Iteration completed"),
        IterationOutcome::Aborted { reason } => println!("Iteration aborted: {}", reason),
    }
    print!("{}", metrics.take_snapshot());

    if !outcome.is_completed() {
        anyhow::bail!("Iteration {} of VU {} was aborted", iteration, vu);
    }
    Ok(())
}

/// Implementation of the 'list' command - shows built-in presets
pub fn cmd_list() -> Result<()> {
    println!("Available scenarios:");
    println!("==================");

    for scenario in Presets::all_scenarios() {
        println!("  {:<16} - {}", scenario.name, scenario.description);
        let vus = scenario.options.vus;
        println!(
            "  {:<16}   {} VU{} for {}, {} pause",
            "",
            vus,
            if vus == 1 { "" } else { "s" },
            format_duration(scenario.options.duration),
            format_duration(scenario.think_time)
        );
    }

    println!("\nAliases:");
    println!("  read, list        - read_only");
    println!("  slow              - read_only_slow");
    println!("  crud              - crud_lifecycle");
    println!("\nAny other argument is read as a JSON scenario file.");

    Ok(())
}

/// Implementation of the 'serve' command - runs the simulator until Ctrl-C
pub async fn cmd_serve(bind: String, port: u16) -> Result<()> {
    let config = SimConfig {
        bind_address: bind,
        port,
    };
    let listener = config.bind().await?;
    info!(
        "Serving client API at http://{}{}",
        listener.local_addr()?,
        client_api_sim::COLLECTION_PATH
    );

    let shutdown = CancellationToken::new();
    let interrupt = spawn_ctrl_c(shutdown.clone());
    client_api_sim::serve(listener, Arc::new(ClientStore::new()), shutdown).await?;
    interrupt.abort();

    Ok(())
}

/// Helper function to resolve a preset name or JSON file path to a scenario
fn resolve_scenario(scenario: &str) -> Result<TestScenario> {
    if let Some(preset) = Presets::find(scenario) {
        return Ok(preset);
    }

    let path = Path::new(scenario);
    if path.is_file() {
        return TestScenario::from_json_file(path)
            .with_context(|| format!("Failed to load scenario file '{}'", scenario));
    }

    error!("Unknown scenario: {}", scenario);
    anyhow::bail!(
        "Scenario '{}' not found. Use a preset name (see 'list') or a JSON file path.",
        scenario
    );
}

fn apply_base_url(scenario: &mut TestScenario, base_url: Option<&str>) -> Result<()> {
    if let Some(url) = base_url {
        scenario.endpoint = Endpoint::new(url)?;
    }
    Ok(())
}

fn spawn_ctrl_c(shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Interrupted by user");
            shutdown.cancel();
        }
    })
}

fn print_summary(summary: &RunSummary) {
    println!("Scenario: {}", summary.scenario);
    println!(
        "VUs: {}  elapsed: {:.1}s{}",
        summary.vus,
        summary.elapsed.as_secs_f64(),
        if summary.cancelled { "  (interrupted)" } else { "" }
    );
    print!("{}", summary.snapshot);
}
