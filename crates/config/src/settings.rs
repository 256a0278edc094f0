//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Language-model collaborator configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Scoring model artifacts
    #[serde(default)]
    pub models: ModelPaths,

    /// Application storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Optional YAML file overriding the built-in product registry
    #[serde(default)]
    pub product_registry_path: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty defaults to localhost:3000
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Disable to allow any origin (development only)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Idle seconds before a session is evicted
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
    /// Seconds between eviction sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8001
}
fn default_true() -> bool {
    true
}
fn default_max_sessions() -> usize {
    1000
}
fn default_session_timeout() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            cors_enabled: default_true(),
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl ServerConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Language-model collaborator configuration
///
/// The agent must remain fully functional when no API key is configured —
/// extraction and follow-up generation fall back to deterministic paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key; absent means the collaborator is not configured
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Per-call timeout in seconds. Extraction must stay snappy; failures
    /// fall through to the deterministic path.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,
}

fn default_llm_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}
fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    8
}
fn default_llm_max_tokens() -> usize {
    500
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: default_llm_api_key(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

/// Scoring model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPaths {
    /// Directory holding one `<loan_type>_scorer.json` artifact per product
    #[serde(default = "default_models_dir")]
    pub dir: String,
}

fn default_models_dir() -> String {
    "models".to_string()
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
        }
    }
}

/// Application storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for saved applications and CSV reports
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "customer_data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log filter, e.g. "info,loan_agent=debug"
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json_logs: bool,
    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json_logs: false,
            metrics_enabled: default_true(),
        }
    }
}

/// Load settings from files and environment.
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env)).required(false));
    }

    let config = builder
        .add_source(Environment::with_prefix("LOAN_AGENT").separator("__"))
        .build()?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8001);
        assert_eq!(settings.server.max_sessions, 1000);
        assert_eq!(settings.llm.timeout_secs, 8);
        assert_eq!(settings.models.dir, "models");
    }

    #[test]
    fn test_session_timeout_duration() {
        let server = ServerConfig::default();
        assert_eq!(server.session_timeout(), Duration::from_secs(3600));
    }
}
