//! HTTP API - the portal page as JSON
//!
//! Read the rendered state, and trigger each user action. Action routes
//! answer with the outcome and the state after the action finished.

use crate::chain::ChainProvider;
use crate::config::ApiConfig;
use crate::error::{PortalError, PortalResult};
use crate::portal::view::PortalView;
use crate::portal::{ActionOutcome, PortalClient};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<PortalClient>,
    pub provider: Arc<ChainProvider>,
}

/// Run the HTTP API server
pub async fn run_server(
    config: ApiConfig,
    portal: Arc<PortalClient>,
    provider: Arc<ChainProvider>,
) -> PortalResult<()> {
    let app = router(AppState { portal, provider });

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PortalError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| PortalError::Internal(e.to_string()))?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/state", get(get_state))
        .route("/wallet/connect", post(connect_wallet))
        .route("/board/initialize", post(initialize_board))
        .route("/input", put(update_input))
        .route("/submissions", post(submit_link))
        .route("/submissions/refresh", post(refresh_submissions))
        .route("/submissions/:id/upvote", post(upvote))
        .route("/submissions/:id/tip", post(tip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint - basic liveness
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check - RPC endpoint reachable
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let rpc_ok = state.provider.health_check().await;
    let code = if rpc_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ReadinessResponse {
            ready: rpc_ok,
            endpoint: state.provider.endpoint(),
        }),
    )
}

async fn get_state(State(state): State<AppState>) -> Json<PortalView> {
    Json(state.portal.view())
}

async fn connect_wallet(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.portal.connect().await;
    respond(&state, outcome)
}

async fn refresh_submissions(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.portal.refresh_list().await;
    respond(&state, outcome)
}

async fn initialize_board(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.portal.initialize_account().await;
    respond(&state, outcome)
}

async fn update_input(
    State(state): State<AppState>,
    Json(body): Json<InputRequest>,
) -> Json<PortalView> {
    state.portal.update_input(body.value);
    Json(state.portal.view())
}

async fn submit_link(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> impl IntoResponse {
    let outcome = state.portal.submit_link(body.link).await;
    respond(&state, outcome)
}

async fn upvote(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    let outcome = state.portal.upvote(id).await;
    respond(&state, outcome)
}

async fn tip(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    let outcome = state.portal.tip(id).await;
    respond(&state, outcome)
}

fn respond(state: &AppState, outcome: ActionOutcome) -> (StatusCode, Json<ActionResponse>) {
    let code = match outcome {
        ActionOutcome::Succeeded => StatusCode::OK,
        ActionOutcome::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        ActionOutcome::Failed => StatusCode::BAD_GATEWAY,
    };

    (
        code,
        Json(ActionResponse {
            outcome,
            view: state.portal.view(),
        }),
    )
}

// Request/response types

#[derive(Deserialize)]
struct InputRequest {
    value: String,
}

#[derive(Deserialize)]
struct SubmitRequest {
    link: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    endpoint: String,
}

#[derive(Serialize)]
struct ActionResponse {
    outcome: ActionOutcome,
    view: PortalView,
}
