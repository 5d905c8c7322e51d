use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use threadbot_core::config::{DedupBackend, ModelProvider, ThreadbotConfig};
use threadbot_dedup::{DedupStore, DeduplicationGate, DynamoDedupStore, SqliteDedupStore};
use threadbot_llm::{AnthropicProvider, BedrockProvider, LlmProvider};
use threadbot_slack::{SlackClient, UserDirectory};
use threadbot_workflow::MentionWorkflow;
use tracing::{info, warn};

mod app;
mod dispatch;
mod http;
mod intake;
mod signature;

#[derive(Parser, Debug)]
#[command(name = "threadbot-gateway", version, about = "Slack thread assistant gateway")]
struct Cli {
    /// Path to threadbot.toml (default: ~/.threadbot/threadbot.toml).
    #[arg(long, env = "THREADBOT_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threadbot_gateway=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ThreadbotConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        ThreadbotConfig::default()
    });

    let store = build_store(&config)?;
    let gate = DeduplicationGate::new(store, config.dedup.ttl_secs);
    info!(backend = gate.backend(), ttl_secs = config.dedup.ttl_secs, "dedup gate ready");

    let slack = SlackClient::new(config.slack.bot_token.clone());
    if !slack.is_configured() {
        warn!("slack.bot_token is empty; every Slack call will fail");
    }

    let provider = build_provider(&config)?;
    info!(provider = provider.name(), model = %config.model.model_id, "model provider ready");

    let slack = Arc::new(slack);
    let directory = Arc::new(UserDirectory::new(slack.clone()));
    let workflow = Arc::new(MentionWorkflow::new(
        slack,
        directory,
        provider,
        gate.clone(),
        config.model.clone(),
    ));
    let dispatcher = dispatch::from_config(&config.dispatch, Arc::clone(&workflow))?;
    info!(dispatcher = dispatcher.name(), "task dispatcher ready");

    let verifier = signature::SignatureVerifier::from_secret(&config.slack.signing_secret);
    if verifier.is_none() {
        warn!("slack.signing_secret is empty; request signatures are NOT verified");
    }
    if config.worker.enabled && config.dispatch.token.is_none() {
        warn!("dispatch.token is unset; /tasks accepts unauthenticated requests");
    }

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let events_path = config.gateway.events_path.clone();

    let intake = intake::IntakeDispatcher::new(verifier, gate, dispatcher);
    let state = Arc::new(app::AppState::new(config, intake, workflow));
    let router = app::build_router(state);

    info!(events_path = %events_path, "Threadbot gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

/// Open the configured dedup backend.
///
/// SQLite also gets a background sweep of expired rows; DynamoDB expires
/// them natively through the table's TTL attribute.
fn build_store(config: &ThreadbotConfig) -> anyhow::Result<Arc<dyn DedupStore>> {
    match config.dedup.backend {
        DedupBackend::Sqlite => {
            let db_path = &config.dedup.path;
            ensure_parent_dir(db_path);
            info!(path = %db_path, "opening SQLite dedup store");

            let db = rusqlite::Connection::open(db_path)?;
            db.execute_batch("PRAGMA journal_mode=WAL;")?;
            let store = Arc::new(SqliteDedupStore::new(db)?);

            let sweeper = Arc::clone(&store);
            let every = std::time::Duration::from_secs(config.dedup.purge_interval_secs.max(1));
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(every);
                loop {
                    tick.tick().await;
                    match sweeper.purge_expired(chrono::Utc::now().timestamp()) {
                        Ok(0) => {}
                        Ok(n) => info!(removed = n, "purged expired dedup records"),
                        Err(e) => warn!(error = %e, "dedup purge failed"),
                    }
                }
            });

            Ok(store)
        }
        DedupBackend::Dynamodb => {
            let client = threadbot_aws::AwsClient::from_env(
                &config.aws.region,
                "dynamodb",
                config.aws.profile.as_deref(),
            )?;
            info!(table = %config.dedup.table, region = %config.aws.region, "using DynamoDB dedup store");
            Ok(Arc::new(DynamoDedupStore::new(
                client,
                config.dedup.table.clone(),
                config.dedup.endpoint.clone(),
            )))
        }
    }
}

/// Build the model provider named by `model.provider`.
///
/// The Anthropic key comes from `model.api_key`, then ANTHROPIC_API_KEY.
fn build_provider(config: &ThreadbotConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    match config.model.provider {
        ModelProvider::Bedrock => Ok(Arc::new(BedrockProvider::from_env(
            &config.aws.region,
            config.aws.profile.as_deref(),
        )?)),
        ModelProvider::Anthropic => {
            let api_key = config
                .model
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("model.provider = \"anthropic\" requires model.api_key or ANTHROPIC_API_KEY")
                })?;
            Ok(Arc::new(AnthropicProvider::new(
                api_key,
                config.model.base_url.clone(),
            )))
        }
    }
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
