//! End-to-end tests driving real HTTP servers on loopback

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    Router,
};
use client_api_sim::ClientStore;
use loadgen::{
    Executor, IterationContext, IterationOutcome, ReqwestTransport, ScenarioRunner,
};
use observability::MetricsCollector;
use scenarios::{ClientId, Endpoint, ScenarioBuilder, ScenarioKind, TestScenario};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Call {
    method: String,
    path: String,
    body: String,
}

/// Answers every request with 200, replying `creation_reply` to POSTs
struct Stub {
    calls: Mutex<Vec<Call>>,
    creation_reply: &'static str,
}

async fn record_call(State(stub): State<Arc<Stub>>, method: Method, uri: Uri, body: Bytes) -> String {
    stub.calls.lock().unwrap().push(Call {
        method: method.to_string(),
        path: uri.path().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    if method == Method::POST {
        stub.creation_reply.to_string()
    } else {
        "[]".to_string()
    }
}

async fn start_stub(creation_reply: &'static str) -> (SocketAddr, Arc<Stub>) {
    let stub = Arc::new(Stub {
        calls: Mutex::new(Vec::new()),
        creation_reply,
    });
    let app = Router::new().fallback(record_call).with_state(stub.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, stub)
}

fn crud_scenario(addr: SocketAddr) -> TestScenario {
    ScenarioBuilder::new("crud_e2e")
        .kind(ScenarioKind::CrudLifecycle)
        .endpoint(Endpoint::new(format!("http://{addr}/api/v1/client")).unwrap())
        .think_time(Duration::ZERO)
        .build()
}

fn runner(scenario: TestScenario) -> ScenarioRunner<ReqwestTransport> {
    ScenarioRunner::new(
        scenario,
        ReqwestTransport::new().unwrap(),
        Arc::new(MetricsCollector::new()),
    )
}

#[tokio::test]
async fn test_crud_iteration_against_stub() {
    init_tracing();
    let (addr, stub) = start_stub(r#"{"codcli": 42}"#).await;
    let runner = runner(crud_scenario(addr));

    let outcome = runner
        .run_iteration(IterationContext::new(1, 0), &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        IterationOutcome::Completed {
            client_id: Some(ClientId::new("42"))
        }
    );

    let calls = stub.calls.lock().unwrap().clone();
    let summary: Vec<_> = calls
        .iter()
        .map(|c| (c.method.as_str(), c.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("GET", "/api/v1/client/"),
            ("POST", "/api/v1/client/"),
            ("PATCH", "/api/v1/client/42"),
            ("DELETE", "/api/v1/client/42"),
        ]
    );

    let created: serde_json::Value = serde_json::from_str(&calls[1].body).unwrap();
    assert_eq!(created["email"], "alice1_0@example.com");
    assert_eq!(created["nom"], "Durand");
    let patch: serde_json::Value = serde_json::from_str(&calls[2].body).unwrap();
    assert_eq!(patch, serde_json::json!({ "prenom": "Alicia" }));
    assert!(calls[3].body.is_empty());
}

#[tokio::test]
async fn test_empty_creation_body_aborts_iteration() {
    init_tracing();
    let (addr, stub) = start_stub("").await;
    let runner = runner(crud_scenario(addr));

    let outcome = runner
        .run_iteration(IterationContext::new(1, 0), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, IterationOutcome::Aborted { .. }));

    let methods: Vec<_> = stub
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.method.clone())
        .collect();
    assert_eq!(methods, vec!["GET", "POST"]);
    assert_eq!(runner.metrics().iterations().aborted, 1);
}

#[tokio::test]
async fn test_read_only_hits_collection_without_slash() {
    init_tracing();
    let (addr, stub) = start_stub("{}").await;
    let scenario = TestScenario::read_only()
        .with_endpoint(Endpoint::new(format!("http://{addr}/api/v1/client")).unwrap())
        .with_think_time(Duration::ZERO);
    let runner = runner(scenario);

    runner
        .run_iteration(IterationContext::new(1, 0), &CancellationToken::new())
        .await;

    let calls = stub.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].path, "/api/v1/client");
}

#[tokio::test]
async fn test_executor_against_simulator_leaves_store_empty() {
    init_tracing();
    let store = Arc::new(ClientStore::new());
    let cancel = CancellationToken::new();
    let (addr, server) = client_api_sim::spawn_local(store.clone(), cancel.clone())
        .await
        .unwrap();

    let scenario = ScenarioBuilder::new("crud_sim")
        .kind(ScenarioKind::CrudLifecycle)
        .endpoint(Endpoint::new(format!("http://{addr}/api/v1/client")).unwrap())
        .think_time(Duration::from_millis(10))
        .vus(4)
        .duration(Duration::from_millis(300))
        .build();
    let executor = Executor::new(runner(scenario)).unwrap();

    let summary = executor.run(CancellationToken::new()).await.unwrap();

    assert!(summary.iterations.completed >= 4);
    assert_eq!(summary.iterations.aborted, 0);
    assert_eq!(summary.snapshot.total_failures, 0);
    assert_eq!(summary.iterations_per_vu.len(), 4);
    assert!(store.is_empty());

    cancel.cancel();
    server.await.unwrap().unwrap();
}
