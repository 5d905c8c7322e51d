//! Async handoff from intake to the mention workflow.
//!
//! Delivery is at least once; the dedup gate and the worker's terminal-status
//! check keep the workflow from running twice for one event id.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use threadbot_core::DispatchPayload;
use threadbot_workflow::MentionWorkflow;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("worker rejected task with status {status}")]
    Rejected { status: u16 },
}

#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Hand the task off. Returns once it is accepted, not once it has run.
    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError>;
}

/// Runs the workflow on this process's runtime.
pub struct LocalDispatcher {
    workflow: Arc<MentionWorkflow>,
}

impl LocalDispatcher {
    pub fn new(workflow: Arc<MentionWorkflow>) -> Self {
        Self { workflow }
    }
}

#[async_trait]
impl TaskDispatcher for LocalDispatcher {
    fn name(&self) -> &str {
        "local"
    }

    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError> {
        let workflow = Arc::clone(&self.workflow);
        let payload = payload.clone();
        tokio::spawn(async move {
            workflow.handle_task(&payload).await;
        });
        Ok(())
    }
}

/// Upper bound on one handoff. Intake awaits it inline, so it must stay well
/// under Slack's three-second ack deadline.
pub const HANDOFF_TIMEOUT: Duration = Duration::from_secs(2);

/// POSTs the task to a worker's `/tasks` route.
pub struct HttpDispatcher {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpDispatcher {
    pub fn new(url: String, token: Option<String>) -> Result<Self, DispatchError> {
        Self::with_timeout(url, token, HANDOFF_TIMEOUT)
    }

    pub fn with_timeout(
        url: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url, token })
    }
}

#[async_trait]
impl TaskDispatcher for HttpDispatcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError> {
        let mut req = self.client.post(&self.url).json(payload);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if resp.status() != StatusCode::ACCEPTED {
            return Err(DispatchError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        debug!(url = %self.url, "task accepted by worker");
        Ok(())
    }
}

/// Pick the dispatcher for the configured mode.
pub fn from_config(
    config: &threadbot_core::config::DispatchConfig,
    workflow: Arc<MentionWorkflow>,
) -> anyhow::Result<Arc<dyn TaskDispatcher>> {
    use threadbot_core::config::DispatchMode;

    let dispatcher: Arc<dyn TaskDispatcher> = match config.mode {
        DispatchMode::Local => Arc::new(LocalDispatcher::new(workflow)),
        DispatchMode::Http => {
            let url = config
                .worker_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| anyhow::anyhow!("dispatch.mode = \"http\" requires dispatch.worker_url"))?;
            info!(url = %url, "dispatching tasks over HTTP");
            Arc::new(HttpDispatcher::new(url, config.token.clone())?)
        }
    };
    Ok(dispatcher)
}
