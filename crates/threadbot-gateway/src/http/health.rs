use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns build and backend metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git_sha": env!("THREADBOT_GIT_SHA"),
        "dedup": state.intake.gate().backend(),
        "worker": state.config.worker.enabled,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use threadbot_core::config::ThreadbotConfig;
    use tower::ServiceExt;

    use crate::app::{build_router, tests::test_state};

    #[tokio::test]
    async fn reports_status_and_backend() {
        let (state, _) = test_state(ThreadbotConfig::default());
        let resp = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dedup"], "sqlite");
        assert_eq!(body["worker"], true);
        assert!(body["git_sha"].is_string());
    }
}
