//! Builds the Axum router: RPC-shaped POST routes, the `ReportHealth`
//! WebSocket route, and the client-facing HTTP surface. Both surfaces
//! share one [`AppState`] and call the same handler functions.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::SurfaceError;
use crate::handlers;
use crate::state::AppState;
use crate::wire::{InferenceRequest, RegisterAgentRequest};
use crate::ws::report_health;

/// Builds the full router over the given application state.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/rpc/request-inference", post(rpc_request_inference))
        .route("/rpc/register-agent", post(rpc_register_agent))
        .route("/rpc/query-status", get(rpc_query_status))
        .route("/rpc/public-key", post(rpc_public_key))
        .route("/rpc/report-health", get(report_health))
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/status", get(api_status))
        .route("/api/v1/inference/request", post(api_inference_request))
        .with_state(state)
}

async fn rpc_request_inference(
    State(state): State<AppState>,
    Json(request): Json<InferenceRequest>,
) -> Result<impl IntoResponse, SurfaceError> {
    let response = handlers::request_inference(&state, request).await?;
    Ok(Json(response))
}

async fn rpc_register_agent(
    State(state): State<AppState>,
    Json(request): Json<RegisterAgentRequest>,
) -> Result<impl IntoResponse, SurfaceError> {
    let response = handlers::register_agent(&state, request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    include_agents: bool,
}

async fn rpc_query_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    Json(handlers::query_system_status(&state, query.include_agents).await)
}

async fn rpc_public_key(State(state): State<AppState>) -> impl IntoResponse {
    Json(handlers::get_public_key(&state))
}

async fn api_health() -> impl IntoResponse {
    Json(handlers::health())
}

async fn api_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    Json(handlers::query_system_status(&state, query.include_agents).await)
}

async fn api_inference_request(
    State(state): State<AppState>,
    Json(request): Json<InferenceRequest>,
) -> Result<impl IntoResponse, SurfaceError> {
    let response = handlers::request_inference(&state, request).await?;
    Ok(Json(response))
}
