//! HTTP endpoints
//!
//! REST API mirroring the conversation contract: start a session for a loan
//! type, exchange messages, inspect sessions, and admin reporting over
//! saved applications.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use loan_agent_agent::DecisionSummary;
use loan_agent_core::{LoanType, Profile};

use crate::metrics;
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Chat endpoints
        .route("/api/chat/start", post(chat_start))
        .route("/api/chat/message", post(chat_message))
        // Catalog
        .route("/api/loan-types", get(loan_types))
        // Session endpoints
        .route("/api/sessions/:id", get(session_info))
        .route("/api/sessions/:id", delete(delete_session))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Admin reporting
        .route("/admin/applications/:loan_type", get(recent_applications))
        .route("/admin/stats", get(all_stats))
        .route("/admin/stats/:loan_type", get(product_stats))
        .route("/admin/export/:loan_type", get(export_csv))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// Disabled CORS allows everything (development only); an empty origin list
/// defaults to localhost:3000.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!(origins = parsed.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

// ---------- Schemas ----------

#[derive(Debug, Deserialize)]
struct StartChatRequest {
    loan_type: String,
}

#[derive(Debug, Serialize)]
struct StartChatResponse {
    session_id: String,
    loan_type: LoanType,
    message: String,
    required_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    session_id: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
    recorded: Profile,
    missing_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction: Option<DecisionSummary>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

// ---------- Chat endpoints ----------

async fn chat_start(
    State(state): State<AppState>,
    Json(request): Json<StartChatRequest>,
) -> Result<Json<StartChatResponse>, ApiError> {
    let loan_type = LoanType::from_str(&request.loan_type).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid loan type. Available types: {}",
                state
                    .registry
                    .available()
                    .iter()
                    .map(|lt| lt.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    })?;

    let controller = state
        .controller(loan_type)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Loan type not available"))?;

    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let (conversation, greeting) = controller.start(&session_id).await;

    state
        .sessions
        .create(session_id.clone(), loan_type, conversation)
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(Json(StartChatResponse {
        session_id,
        loan_type,
        message: greeting,
        required_fields: controller
            .product()
            .required_fields()
            .into_iter()
            .map(String::from)
            .collect(),
    }))
}

async fn chat_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = state
        .sessions
        .get(&request.session_id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Invalid session_id."))?;
    session.touch();

    let controller = state
        .controller(session.loan_type)
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Loan type not available"))?;

    // Holding the conversation lock for the whole turn serializes
    // concurrent messages on the same session.
    let start = Instant::now();
    let mut conversation = session.conversation.lock().await;
    let outcome = controller
        .handle_turn(&mut conversation, &request.message)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %request.session_id, error = %e, "Turn failed");
            metrics::record_turn_error(session.loan_type);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "We hit a problem processing your application. Please try again.",
            )
        })?;
    drop(conversation);

    metrics::record_turn(session.loan_type, start.elapsed().as_millis() as f64);
    if outcome.rejected_field.is_some() {
        metrics::record_rejection(session.loan_type);
    }
    if let Some(decision) = &outcome.decision {
        metrics::record_decision(session.loan_type, decision.verdict.status);
    }

    Ok(Json(MessageResponse {
        message: outcome.message,
        recorded: outcome.recorded,
        missing_fields: outcome.missing_fields,
        prediction: outcome.decision,
    }))
}

// ---------- Catalog and session endpoints ----------

async fn loan_types(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut descriptions = HashMap::new();
    for loan_type in state.registry.available() {
        if let Some(product) = state.registry.get(loan_type) {
            descriptions.insert(loan_type.as_str(), product.description.clone());
        }
    }

    Json(serde_json::json!({
        "available_types": state.registry.available(),
        "descriptions": descriptions,
    }))
}

async fn session_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Session not found"))?;
    let controller = state
        .controller(session.loan_type)
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Loan type not available"))?;

    let conversation = session.conversation.lock().await;
    let required = controller.product().required_fields();
    let collected: Vec<&str> = required
        .iter()
        .copied()
        .filter(|f| conversation.profile.contains_key(*f))
        .collect();
    let missing = controller.missing_fields(&conversation.profile);
    let completion = if required.is_empty() {
        100.0
    } else {
        (collected.len() as f64 / required.len() as f64 * 100.0 * 100.0).round() / 100.0
    };

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "loan_type": session.loan_type,
        "required_fields": required,
        "collected_fields": collected,
        "missing_fields": missing,
        "completion_percentage": completion,
        "turn_count": conversation.turn_count(),
        "created_at": conversation.created_at,
    })))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.sessions.remove(&id);
    StatusCode::NO_CONTENT
}

// ---------- Health and metrics ----------

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ---------- Admin endpoints ----------

#[derive(Debug, Deserialize)]
struct RecentQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

fn parse_loan_type(raw: &str) -> Result<LoanType, ApiError> {
    LoanType::from_str(raw).ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid loan type"))
}

async fn recent_applications(
    State(state): State<AppState>,
    Path(loan_type): Path<String>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let loan_type = parse_loan_type(&loan_type)?;
    let applications = state
        .store
        .recent(loan_type, query.limit)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(serde_json::json!({
        "loan_type": loan_type,
        "applications": applications,
    })))
}

async fn product_stats(
    State(state): State<AppState>,
    Path(loan_type): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let loan_type = parse_loan_type(&loan_type)?;
    let stats = state
        .store
        .stats(loan_type)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(serde_json::json!({
        "loan_type": loan_type,
        "statistics": stats,
    })))
}

async fn all_stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut all = HashMap::new();
    for loan_type in state.registry.available() {
        let stats = state
            .store
            .stats(loan_type)
            .await
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        all.insert(loan_type.as_str(), stats);
    }
    Ok(Json(serde_json::json!(all)))
}

async fn export_csv(
    State(state): State<AppState>,
    Path(loan_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let loan_type = parse_loan_type(&loan_type)?;
    let csv = state
        .store
        .export_csv(loan_type)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}_applications.csv\"", loan_type),
            ),
        ],
        csv,
    ))
}
