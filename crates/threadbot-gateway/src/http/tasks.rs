//! Worker ingress: POST /tasks, the receiving end of `HttpDispatcher`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use threadbot_core::DispatchPayload;
use tracing::{info, warn};

use crate::app::AppState;
use crate::signature::constant_time_eq;

/// Accepts a task and runs it in the background.
///
/// Returns 202 once the task is spawned; the dispatcher never waits for the
/// workflow itself.
pub async fn tasks_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(ref token) = state.config.dispatch.token {
        if !bearer_matches(&headers, token) {
            warn!("task rejected: bad or missing bearer token");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "unauthorized"})),
            ));
        }
    }

    let payload: DispatchPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "task rejected: malformed payload");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "malformed task payload"})),
        )
    })?;

    let event_id = payload.event_id().unwrap_or("").to_string();
    info!(event_id = %event_id, "task accepted");

    let workflow = Arc::clone(&state.workflow);
    tokio::spawn(async move {
        workflow.handle_task(&payload).await;
    });

    Ok((StatusCode::ACCEPTED, Json(json!({"accepted": event_id}))))
}

fn bearer_matches(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|presented| constant_time_eq(presented.as_bytes(), token.as_bytes()))
        .unwrap_or(false)
}
