use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use chainsign_core::Result as ServiceResult;
use chainsign_signing::{
    CreateDeviceRequest, ListDevicesRequest, ListTransactionsRequest, SignTransactionRequest,
    SigningService,
};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v0/health", get(health_check))
        .route("/api/v0/signature-device", post(create_signature_device))
        .route("/api/v0/signature-device/list", get(list_signature_devices))
        .route("/api/v0/signature-device/:id", get(get_signature_device))
        .route("/api/v0/signature-device/:id/verify", get(verify_signature_device))
        .route("/api/v0/sign-transaction", post(sign_transaction))
        .route("/api/v0/sign-transaction/list", get(list_transactions))
        .route("/api/v0/sign-transaction/:id", get(get_transaction))
        .with_state(state)
}

fn data<T: Serialize>(payload: T) -> Json<Value> {
    Json(json!({ "data": payload }))
}

/// Runs key generation and signing off the async workers.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(SigningService) -> ServiceResult<T> + Send + 'static,
{
    let service = state.signing.clone();
    tokio::task::spawn_blocking(move || f(service))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    data(json!({
        "status": "pass",
        "version": "v0",
        "timestamp": Utc::now().to_rfc3339(),
        "metrics": state.signing.metrics(),
        "ledger": state.signing.ledger().metrics(),
    }))
}

pub async fn create_signature_device(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let device_id = request.id.clone();

    let response = blocking(&state, move |service| service.create_device(request)).await?;
    info!(device_id = %device_id, "Created signature device via API");

    Ok((StatusCode::CREATED, data(response)))
}

pub async fn list_signature_devices(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListDevicesRequest>, QueryRejection>,
) -> ApiResult {
    let Query(request) = query.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let response = state.signing.list_devices(request)?;
    Ok(data(response))
}

pub async fn get_signature_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let response = state.signing.get_device(&id)?;
    Ok(data(response))
}

pub async fn verify_signature_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let result = blocking(&state, move |service| service.verify_chain(&id)).await?;
    Ok(data(result))
}

pub async fn sign_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignTransactionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let response = blocking(&state, move |service| service.sign_transaction(request)).await?;
    Ok(data(response))
}

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTransactionsRequest>, QueryRejection>,
) -> ApiResult {
    let Query(request) = query.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let response = state.signing.list_transactions(request)?;
    Ok(data(response))
}

pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let response = state.signing.get_transaction(&id)?;
    Ok(data(response))
}
