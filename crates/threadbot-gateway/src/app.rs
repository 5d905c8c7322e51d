use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use threadbot_core::config::ThreadbotConfig;
use threadbot_workflow::MentionWorkflow;

use crate::intake::IntakeDispatcher;

/// Shared state handed to every Axum handler as `Arc<AppState>`.
pub struct AppState {
    pub config: ThreadbotConfig,
    pub intake: IntakeDispatcher,
    /// Runs tasks arriving on `/tasks`.
    pub workflow: Arc<MentionWorkflow>,
}

impl AppState {
    pub fn new(
        config: ThreadbotConfig,
        intake: IntakeDispatcher,
        workflow: Arc<MentionWorkflow>,
    ) -> Self {
        Self {
            config,
            intake,
            workflow,
        }
    }
}

/// Assemble the Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(
            &state.config.gateway.events_path,
            post(crate::http::events::events_handler),
        )
        .route("/health", get(crate::http::health::health_handler));

    if state.config.worker.enabled {
        router = router.route("/tasks", post(crate::http::tasks::tasks_handler));
    }

    router
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use threadbot_core::config::ModelConfig;
    use threadbot_dedup::{DeduplicationGate, SqliteDedupStore};
    use threadbot_llm::AnthropicProvider;
    use threadbot_slack::SlackClient;
    use tower::ServiceExt;

    use super::*;
    use crate::intake::tests::{mention_body, signed, RecordingDispatcher, SECRET};
    use crate::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};

    /// State wired to in-memory fakes. Slack and the model are never reached.
    pub(crate) fn test_state(
        config: ThreadbotConfig,
    ) -> (Arc<AppState>, Arc<RecordingDispatcher>) {
        let gate = DeduplicationGate::new(Arc::new(SqliteDedupStore::in_memory().unwrap()), 300);
        let slack = Arc::new(SlackClient::new(""));
        let workflow = Arc::new(MentionWorkflow::new(
            slack.clone(),
            Arc::new(threadbot_slack::UserDirectory::new(slack)),
            Arc::new(AnthropicProvider::new("unused".into(), Some("http://127.0.0.1:9".into()))),
            gate.clone(),
            ModelConfig::default(),
        ));
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let intake = IntakeDispatcher::new(
            crate::signature::SignatureVerifier::from_secret(&config.slack.signing_secret),
            gate,
            dispatcher.clone(),
        );
        (Arc::new(AppState::new(config, intake, workflow)), dispatcher)
    }

    pub(crate) fn signed_config() -> ThreadbotConfig {
        let mut config = ThreadbotConfig::default();
        config.slack.signing_secret = SECRET.into();
        config
    }

    async fn body_string(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn events_route_answers_challenge() {
        let (state, _) = test_state(signed_config());
        let resp = build_router(state)
            .oneshot(
                Request::post("/slack/events")
                    .body(Body::from(r#"{"type":"url_verification","challenge":"xyz"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(body_string(resp).await, r#"{"challenge":"xyz"}"#);
    }

    #[tokio::test]
    async fn events_route_rejects_unsigned_mention() {
        let (state, dispatcher) = test_state(signed_config());
        let resp = build_router(state)
            .oneshot(
                Request::post("/slack/events")
                    .body(Body::from(mention_body("Ev1", Some("1.0"))))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(resp).await, "Unauthorized");
        assert_eq!(dispatcher.count(), 0);
    }

    #[tokio::test]
    async fn events_route_dispatches_signed_mention() {
        let (state, dispatcher) = test_state(signed_config());
        let body = mention_body("Ev2", Some("1.0"));
        let (sig, ts) = signed(&body);

        let resp = build_router(state)
            .oneshot(
                Request::post("/slack/events")
                    .header(SIGNATURE_HEADER, sig)
                    .header(TIMESTAMP_HEADER, ts)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "OK");
        assert_eq!(dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn events_path_is_configurable() {
        let mut config = ThreadbotConfig::default();
        config.gateway.events_path = "/hooks/slack".into();
        let (state, _) = test_state(config);
        let router = build_router(state);

        let resp = router
            .clone()
            .oneshot(
                Request::post("/hooks/slack")
                    .body(Body::from(r#"{"type":"url_verification","challenge":"c"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = router
            .oneshot(Request::post("/slack/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tasks_route_absent_when_worker_disabled() {
        let mut config = ThreadbotConfig::default();
        config.worker.enabled = false;
        let (state, _) = test_state(config);

        let resp = build_router(state)
            .oneshot(Request::post("/tasks").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
