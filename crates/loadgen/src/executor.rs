//! Virtual-user executor
//!
//! Spawns one Tokio task per VU. Each VU keeps running iterations until the
//! configured duration has elapsed or the shutdown token fires; an iteration
//! that has already started is allowed to finish.

use crate::runner::{IterationContext, ScenarioRunner};
use crate::transport::HttpTransport;
use crate::LoadgenError;
use observability::{IterationStats, MetricsSnapshot};
use scenarios::LoadOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of a complete load run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub scenario: String,
    pub vus: u32,
    pub elapsed: Duration,
    /// True when the run was stopped by the shutdown token before the deadline
    pub cancelled: bool,
    /// Iterations started by each VU, indexed by `vu - 1`
    pub iterations_per_vu: Vec<u64>,
    pub iterations: IterationStats,
    pub snapshot: MetricsSnapshot,
}

/// Runs a scenario with a fixed number of VUs for a fixed duration
pub struct Executor<T> {
    runner: Arc<ScenarioRunner<T>>,
    options: LoadOptions,
}

impl<T: HttpTransport + 'static> Executor<T> {
    /// Use the scenario's own load options
    pub fn new(runner: ScenarioRunner<T>) -> Result<Self, LoadgenError> {
        let options = runner.scenario().options.clone();
        Self::with_options(runner, options)
    }

    pub fn with_options(runner: ScenarioRunner<T>, options: LoadOptions) -> Result<Self, LoadgenError> {
        options.validate()?;
        Ok(Self {
            runner: Arc::new(runner),
            options,
        })
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Run until the duration elapses or `shutdown` is cancelled
    pub async fn run(&self, shutdown: CancellationToken) -> Result<RunSummary, LoadgenError> {
        let scenario = self.runner.scenario().name.clone();
        let vus = self.options.vus;
        let duration = self.options.duration;

        info!(
            scenario = %scenario,
            vus,
            duration_ms = duration.as_millis() as u64,
            "Starting load run"
        );

        let start = Instant::now();
        let deadline = start + duration;
        let stop = shutdown.child_token();

        let timer = {
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        debug!("Duration elapsed, stopping new iterations");
                        stop.cancel();
                    }
                    _ = stop.cancelled() => {}
                }
            })
        };

        let handles: Vec<_> = (1..=vus)
            .map(|vu| tokio::spawn(run_vu(self.runner.clone(), vu, stop.clone())))
            .collect();

        let results = futures::future::join_all(handles).await;
        stop.cancel();
        timer.await?;

        let mut iterations_per_vu = Vec::with_capacity(results.len());
        for result in results {
            iterations_per_vu.push(result?);
        }

        let elapsed = start.elapsed();
        let cancelled = shutdown.is_cancelled();
        let snapshot = self.runner.metrics().take_snapshot();
        let iterations = snapshot.iterations;

        info!(
            scenario = %scenario,
            elapsed_ms = elapsed.as_millis() as u64,
            completed = iterations.completed,
            aborted = iterations.aborted,
            requests = snapshot.total_requests,
            failed_requests = snapshot.total_failures,
            cancelled,
            "Load run finished"
        );

        Ok(RunSummary {
            scenario,
            vus,
            elapsed,
            cancelled,
            iterations_per_vu,
            iterations,
            snapshot,
        })
    }
}

async fn run_vu<T: HttpTransport>(
    runner: Arc<ScenarioRunner<T>>,
    vu: u32,
    stop: CancellationToken,
) -> u64 {
    let mut iteration = 0u64;
    while !stop.is_cancelled() {
        runner
            .run_iteration(IterationContext::new(vu, iteration), &stop)
            .await;
        iteration += 1;
        // Aborted iterations skip the pause; let the timer and peers run
        tokio::task::yield_now().await;
    }
    debug!(vu, iterations = iteration, "VU finished");
    iteration
}
