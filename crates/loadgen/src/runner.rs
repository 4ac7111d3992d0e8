//! Scenario runner: one iteration of a scenario for one virtual user
//!
//! A CRUD iteration lists the collection, creates a client, reads the
//! `codcli` out of the creation response, patches and deletes that client,
//! then pauses for the scenario's think time. If the creation response
//! cannot be parsed the iteration stops right there, without the pause.

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use observability::{MetricsCollector, RequestSample};
use scenarios::{ClientId, ClientPatch, ClientRecord, ScenarioKind, TestScenario};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub const LIST_CLIENTS: &str = "list_clients";
pub const CREATE_CLIENT: &str = "create_client";
pub const PATCH_CLIENT: &str = "patch_client";
pub const DELETE_CLIENT: &str = "delete_client";

/// Identifies one iteration: VU ids start at 1, iteration ids at 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationContext {
    pub vu: u32,
    pub iteration: u64,
}

impl IterationContext {
    pub fn new(vu: u32, iteration: u64) -> Self {
        Self { vu, iteration }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IterationOutcome {
    /// All requests were issued; `client_id` is set for CRUD iterations
    Completed { client_id: Option<ClientId> },
    /// The creation response was unusable; no patch or delete was sent
    Aborted { reason: String },
}

impl IterationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, IterationOutcome::Completed { .. })
    }
}

/// Runs iterations of one scenario; shared by all VUs
pub struct ScenarioRunner<T> {
    scenario: TestScenario,
    transport: T,
    metrics: Arc<MetricsCollector>,
}

impl<T: HttpTransport> ScenarioRunner<T> {
    pub fn new(scenario: TestScenario, transport: T, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            scenario,
            transport,
            metrics,
        }
    }

    pub fn scenario(&self) -> &TestScenario {
        &self.scenario
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Run one iteration, including the think-time pause on success.
    ///
    /// Cancelling `shutdown` cuts the pause short; requests already started
    /// are always awaited.
    pub async fn run_iteration(
        &self,
        ctx: IterationContext,
        shutdown: &CancellationToken,
    ) -> IterationOutcome {
        let outcome = match self.scenario.kind {
            ScenarioKind::ReadOnly => self.read_only(ctx).await,
            ScenarioKind::CrudLifecycle => self.crud_lifecycle(ctx).await,
        };

        match &outcome {
            IterationOutcome::Completed { .. } => {
                self.metrics.record_iteration_completed();
                let think_time = self.scenario.think_time;
                if !think_time.is_zero() {
                    tokio::select! {
                        _ = sleep(think_time) => {}
                        _ = shutdown.cancelled() => {
                            debug!(vu = ctx.vu, iteration = ctx.iteration, "Think time interrupted");
                        }
                    }
                }
            }
            IterationOutcome::Aborted { .. } => {
                self.metrics.record_iteration_aborted();
            }
        }

        outcome
    }

    async fn read_only(&self, ctx: IterationContext) -> IterationOutcome {
        self.list_clients(ctx).await;
        IterationOutcome::Completed { client_id: None }
    }

    async fn crud_lifecycle(&self, ctx: IterationContext) -> IterationOutcome {
        self.list_clients(ctx).await;

        let record = ClientRecord::for_iteration(ctx.vu, ctx.iteration);
        let create = match HttpRequest::post_json(self.collection_url(), &record) {
            Ok(request) => request,
            Err(e) => return self.abort(ctx, e.to_string()),
        };

        // A transport failure leaves nothing to parse, same as an empty body
        let body = self
            .send_recorded(ctx, CREATE_CLIENT, create)
            .await
            .map(|response| response.body)
            .unwrap_or_default();

        let client_id = match ClientId::from_creation_body(&body) {
            Ok(id) => id,
            Err(e) => return self.abort(ctx, e.to_string()),
        };

        let item_url = self.scenario.endpoint.item_url(&client_id);
        match HttpRequest::patch_json(item_url.as_str(), &ClientPatch::scenario_default()) {
            Ok(patch) => {
                self.send_recorded(ctx, PATCH_CLIENT, patch).await;
            }
            Err(e) => return self.abort(ctx, e.to_string()),
        }

        self.send_recorded(ctx, DELETE_CLIENT, HttpRequest::delete(item_url))
            .await;

        IterationOutcome::Completed {
            client_id: Some(client_id),
        }
    }

    async fn list_clients(&self, ctx: IterationContext) {
        self.send_recorded(ctx, LIST_CLIENTS, HttpRequest::get(self.collection_url()))
            .await;
    }

    fn collection_url(&self) -> String {
        self.scenario
            .endpoint
            .collection_url(self.scenario.collection_trailing_slash)
    }

    fn abort(&self, ctx: IterationContext, reason: String) -> IterationOutcome {
        error!(
            vu = ctx.vu,
            iteration = ctx.iteration,
            error = %reason,
            "No usable client id from creation, ending iteration early"
        );
        IterationOutcome::Aborted { reason }
    }

    /// Send a request and record its outcome; the response is not validated
    async fn send_recorded(
        &self,
        ctx: IterationContext,
        name: &'static str,
        request: HttpRequest,
    ) -> Option<HttpResponse> {
        let method = request.method.as_str();
        let started = Instant::now();
        let result = self.transport.send(request).await;
        let latency = started.elapsed();

        self.metrics.record_request(RequestSample {
            name,
            method,
            status: result.as_ref().ok().map(|response| response.status),
            latency,
        });

        match result {
            Ok(response) => {
                debug!(
                    vu = ctx.vu,
                    iteration = ctx.iteration,
                    request = name,
                    status = response.status,
                    "Request completed"
                );
                Some(response)
            }
            Err(e) => {
                warn!(
                    vu = ctx.vu,
                    iteration = ctx.iteration,
                    request = name,
                    error = %e,
                    "Request failed"
                );
                None
            }
        }
    }
}
