//! HTTP API gateway for Confidant.
//!
//! Exposes the core operations as JSON over REST:
//!
//! - `POST /v1/agents`                        — create an agent
//! - `GET  /v1/agents/{handle}`               — look up an agent
//! - `PUT  /v1/agents/{handle}/persona`       — replace the persona (owner)
//! - `POST /v1/agents/{handle}/documents`     — ingest a document (owner)
//! - `GET  /v1/agents/{handle}/grants`        — list grants (owner)
//! - `PUT  /v1/agents/{handle}/grants/{viewer}` — upsert a grant (owner)
//! - `POST /v1/agents/{handle}/chat`          — ask a question
//! - `GET  /v1/status`                        — uptime/build info
//!
//! Identity management is an external collaborator: every request arrives
//! already authenticated, and the viewer's handle is read from the
//! `x-viewer-handle` header set by the upstream auth proxy.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use confidant_chat::{AskOutcome, ConfidantService};
use confidant_core::agent::AgentSummary;
use confidant_core::document::IngestReceipt;
use confidant_core::error::Error;
use confidant_core::Tier;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Header carrying the authenticated viewer's handle.
pub const VIEWER_HEADER: &str = "x-viewer-handle";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub service: ConfidantService,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(VIEWER_HEADER),
        ]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/status", get(status_handler))
        .route("/v1/agents", post(create_agent_handler))
        .route("/v1/agents/{handle}", get(lookup_agent_handler))
        .route("/v1/agents/{handle}/persona", put(update_persona_handler))
        .route("/v1/agents/{handle}/documents", post(ingest_document_handler))
        .route("/v1/agents/{handle}/grants", get(list_grants_handler))
        .route("/v1/agents/{handle}/grants/{viewer}", put(set_grant_handler))
        .route("/v1/agents/{handle}/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn serve(
    state: SharedState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// A core error rendered as an HTTP response.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, message) = match &err {
            Error::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Error::Forbidden { message } => (StatusCode::FORBIDDEN, message.clone()),
            Error::NotFound { what } => (StatusCode::NOT_FOUND, format!("not found: {what}")),
            Error::ServiceUnavailable { message } => {
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            }
            // Infrastructure details stay in the logs, not in responses.
            Error::Storage(_) | Error::Serialization(_) | Error::Internal(_) => {
                error!(error = %err, "Internal error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// The authenticated viewer's handle, from the auth proxy's header.
fn viewer_handle(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(VIEWER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            message: format!("missing {VIEWER_HEADER} header"),
        })
}

/// Parse a tier string from a request body, re-validating at this boundary.
fn parse_tier(raw: &str) -> Result<Tier, ApiError> {
    Tier::from_str(raw).map_err(ApiError::from)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateAgentRequest {
    handle: String,
    #[serde(default)]
    persona: String,
}

#[derive(Deserialize)]
struct UpdatePersonaRequest {
    persona: String,
}

#[derive(Deserialize)]
struct IngestDocumentRequest {
    tier: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<String>,
    content: String,
}

#[derive(Deserialize)]
struct SetGrantRequest {
    max_tier: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
    /// Omitted means `public` — callers opt upward explicitly.
    #[serde(default)]
    requested_tier: Option<String>,
}

#[derive(Serialize)]
struct GrantDto {
    viewer_handle: String,
    max_tier: Tier,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}

async fn create_agent_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<Json<AgentSummary>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let summary = state
        .service
        .create_agent(&payload.handle, &caller, &payload.persona)
        .await?;
    Ok(Json(summary))
}

async fn lookup_agent_handler(
    State(state): State<SharedState>,
    Path(agent_handle): Path<String>,
    headers: HeaderMap,
) -> Result<Json<AgentSummary>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let summary = state.service.lookup_agent(&agent_handle, &caller).await?;
    Ok(Json(summary))
}

async fn update_persona_handler(
    State(state): State<SharedState>,
    Path(agent_handle): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePersonaRequest>,
) -> Result<Json<AgentSummary>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let summary = state
        .service
        .update_persona(&agent_handle, &caller, &payload.persona)
        .await?;
    Ok(Json(summary))
}

async fn ingest_document_handler(
    State(state): State<SharedState>,
    Path(agent_handle): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<IngestDocumentRequest>,
) -> Result<Json<IngestReceipt>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let tier = parse_tier(&payload.tier)?;
    let receipt = state
        .service
        .ingest_document(
            &agent_handle,
            &caller,
            tier,
            payload.title,
            payload.source,
            &payload.content,
        )
        .await?;
    Ok(Json(receipt))
}

async fn list_grants_handler(
    State(state): State<SharedState>,
    Path(agent_handle): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<GrantDto>>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let grants = state.service.list_grants(&agent_handle, &caller).await?;
    Ok(Json(
        grants
            .into_iter()
            .map(|g| GrantDto { viewer_handle: g.viewer_handle, max_tier: g.max_tier })
            .collect(),
    ))
}

async fn set_grant_handler(
    State(state): State<SharedState>,
    Path((agent_handle, grantee)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<SetGrantRequest>,
) -> Result<StatusCode, ApiError> {
    let caller = viewer_handle(&headers)?;
    let max_tier = parse_tier(&payload.max_tier)?;
    state
        .service
        .set_grant(&agent_handle, &caller, &grantee, max_tier)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn chat_handler(
    State(state): State<SharedState>,
    Path(agent_handle): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<AskOutcome>, ApiError> {
    let caller = viewer_handle(&headers)?;
    let requested_tier = match &payload.requested_tier {
        Some(raw) => parse_tier(raw)?,
        None => Tier::Public,
    };
    let outcome = state
        .service
        .ask(&agent_handle, &caller, requested_tier, &payload.question)
        .await?;
    Ok(Json(outcome))
}

// ── Tests ─────────────────────────────────────────────────────────────────
