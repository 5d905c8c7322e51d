use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_EVENTS_PATH: &str = "/slack/events";
pub const DEFAULT_TABLE: &str = "slack-event-deduplication";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";
/// Lifetime of a dedup record; also the signature replay window.
pub const DEDUP_TTL_SECS: i64 = 300;

/// Flat env names kept for drop-in compatibility with existing deployments,
/// mapped onto their nested config keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SLACK_SIGNING_SECRET", "slack.signing_secret"),
    ("SLACK_BOT_TOKEN", "slack.bot_token"),
    ("DYNAMO_TABLE", "dedup.table"),
    ("BEDROCK_MODEL_ID", "model.model_id"),
    ("AWS_REGION", "aws.region"),
];

/// Top-level config (threadbot.toml + THREADBOT_* env overrides).
///
/// Built once in `main` and handed to each component by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadbotConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route the messaging platform posts events to.
    #[serde(default = "default_events_path")]
    pub events_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            events_path: default_events_path(),
        }
    }
}

/// Messaging-platform credentials.
///
/// Both default to empty. An empty signing secret turns request verification
/// off (local development only); an empty bot token turns every outbound
/// platform call into a `NotConfigured` error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub signing_secret: String,
    #[serde(default)]
    pub bot_token: String,
}

impl SlackConfig {
    pub fn verification_enabled(&self) -> bool {
        !self.signing_secret.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DedupBackend {
    /// Local SQLite file; single-node deployments and development.
    #[default]
    Sqlite,
    /// DynamoDB table with native TTL on the `ttl` attribute.
    Dynamodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub backend: DedupBackend,
    /// DynamoDB table name.
    #[serde(default = "default_table")]
    pub table: String,
    /// DynamoDB endpoint override (DynamoDB Local, LocalStack).
    pub endpoint: Option<String>,
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
    /// How often expired SQLite rows are swept.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            backend: DedupBackend::default(),
            table: default_table(),
            endpoint: None,
            path: default_db_path(),
            ttl_secs: default_ttl_secs(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// Run the workflow on this process's runtime.
    #[default]
    Local,
    /// POST the task to a worker instance's `/tasks` route.
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,
    /// Full URL of the worker route, e.g. `http://worker:3000/tasks`.
    pub worker_url: Option<String>,
    /// Bearer token shared by the dispatcher and the worker route.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModelProvider {
    #[default]
    Bedrock,
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: ModelProvider,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Anthropic API key (only read when `provider = "anthropic"`).
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            model_id: default_model_id(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key: None,
            base_url: None,
        }
    }
}

/// AWS settings shared by the DynamoDB store and the Bedrock provider.
/// Credentials come from AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or ~/.aws/credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    pub profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Serve `POST /tasks` on this instance.
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_events_path() -> String {
    DEFAULT_EVENTS_PATH.to_string()
}
fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}
fn default_ttl_secs() -> i64 {
    DEDUP_TTL_SECS
}
fn default_purge_interval() -> u64 {
    60
}
fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_temperature() -> f32 {
    0.7
}
fn default_region() -> String {
    DEFAULT_REGION.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.threadbot/threadbot.db", home)
}

impl ThreadbotConfig {
    /// Load config from a TOML file with env var overrides.
    ///
    /// Precedence, lowest first:
    ///   1. built-in defaults
    ///   2. TOML file (explicit path, else ~/.threadbot/threadbot.toml)
    ///   3. legacy flat env names (SLACK_BOT_TOKEN, AWS_REGION, ...)
    ///   4. THREADBOT_* env vars, nested with `__`
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::ThreadbotError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(ThreadbotConfig::default()))
            .merge(Toml::file(path))
            .merge(
                Env::raw()
                    .only(&LEGACY_ENV.iter().map(|(k, _)| *k).collect::<Vec<_>>())
                    .map(|key| legacy_key(key.as_str()).into()),
            )
            .merge(Env::prefixed("THREADBOT_").split("__"))
    }
}

fn legacy_key(env_name: &str) -> String {
    LEGACY_ENV
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(env_name))
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| env_name.to_ascii_lowercase())
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.threadbot/threadbot.toml", home)
}
