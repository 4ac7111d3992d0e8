//! HTTP surface of the simulated client API
//!
//! Routes:
//! - `GET /` liveness message
//! - `GET|POST /api/v1/client` (with or without trailing slash)
//! - `GET|PATCH|DELETE /api/v1/client/:id`

use crate::store::{ClientStore, StoredClient};
use crate::{Result, SimError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use scenarios::{ClientPatch, ClientRecord};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const COLLECTION_PATH: &str = "/api/v1/client";
pub const NOT_FOUND_DETAIL: &str = "Client non trouvé";

/// Listening configuration for the simulator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl SimConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|source| SimError::Bind { addr, source })
    }
}

/// Error body in the `{"detail": ...}` shape clients expect
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: NOT_FOUND_DETAIL.to_string(),
        }
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Build the router over a shared store
pub fn router(store: Arc<ClientStore>) -> Router {
    Router::new()
        .route("/", get(root))
        .route(COLLECTION_PATH, get(list_clients).post(create_client))
        .route(
            &format!("{COLLECTION_PATH}/"),
            get(list_clients).post(create_client),
        )
        .route(
            &format!("{COLLECTION_PATH}/:id"),
            get(get_client).patch(patch_client).delete(delete_client),
        )
        .with_state(store)
}

/// Serve on an already bound listener until `cancel` fires
pub async fn serve(
    listener: TcpListener,
    store: Arc<ClientStore>,
    cancel: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Client API simulator started");

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Client API simulator stopped");
    Ok(())
}

/// Bind an ephemeral loopback port and serve in the background
pub async fn spawn_local(
    store: Arc<ClientStore>,
    cancel: CancellationToken,
) -> Result<(SocketAddr, tokio::task::JoinHandle<Result<()>>)> {
    let listener = SimConfig {
        port: 0,
        ..SimConfig::default()
    }
    .bind()
    .await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(serve(listener, store, cancel));
    Ok((addr, handle))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "FastAPI opérationnel" }))
}

async fn list_clients(State(store): State<Arc<ClientStore>>) -> Json<Vec<StoredClient>> {
    Json(store.list())
}

async fn create_client(State(store): State<Arc<ClientStore>>, body: Bytes) -> ApiResult<StoredClient> {
    let record: ClientRecord = parse_body(&body)?;
    let created = store.create(record);
    debug!(codcli = created.codcli, "Client created");
    Ok(Json(created))
}

async fn get_client(
    State(store): State<Arc<ClientStore>>,
    Path(id): Path<String>,
) -> ApiResult<StoredClient> {
    let codcli = parse_id(&id)?;
    store.get(codcli).map(Json).ok_or_else(ApiError::not_found)
}

async fn patch_client(
    State(store): State<Arc<ClientStore>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StoredClient> {
    let codcli = parse_id(&id)?;
    let patch: ClientPatch = parse_body(&body)?;
    store
        .patch(codcli, &patch)
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

async fn delete_client(
    State(store): State<Arc<ClientStore>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let codcli = parse_id(&id)?;
    store.delete(codcli).ok_or_else(ApiError::not_found)?;
    debug!(codcli, "Client deleted");
    Ok(Json(json!({ "message": "Client supprimé" })))
}

fn parse_id(raw: &str) -> std::result::Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::unprocessable(format!("Invalid client id: {raw}")))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> std::result::Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::unprocessable(e.to_string()))
}
