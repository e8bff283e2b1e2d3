use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub firecrawl: FirecrawlConfig,

    pub runner: RunnerConfig,

    pub chat: ChatConfig,

    pub admin: AdminConfig,

    pub quota: QuotaConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// 0 means "let tokio decide".
    pub worker_threads: usize,

    pub event_bus_buffer_size: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,

    pub http_timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: "info".to_string(),
            worker_threads: 0,
            event_bus_buffer_size: 256,
            max_db_connections: 5,
            min_db_connections: 1,
            http_timeout_seconds: 30,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("openscouts").join("openscouts.db"))
        .and_then(|p| p.to_str().map(String::from))
        .map_or_else(
            || "openscouts.db".to_string(),
            |p| format!("sqlite:{p}"),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_ttl_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7700,
            cors_allowed_origins: vec![
                "http://localhost:7700".to_string(),
                "http://127.0.0.1:7700".to_string(),
            ],
            secure_cookies: true,
            session_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirecrawlConfig {
    pub api_url: String,

    /// Partner integration key. Read from the FIRECRAWL_API_KEY environment
    /// variable when unset here.
    pub partner_key: Option<String>,

    /// Shared credential used for users without an active dedicated key.
    pub fallback_key: Option<String>,

    /// Minimum seconds between key regeneration attempts per user.
    pub regenerate_cooldown_seconds: u64,

    pub request_timeout_seconds: u64,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.firecrawl.dev".to_string(),
            partner_key: None,
            fallback_key: None,
            regenerate_cooldown_seconds: 60,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the external execution engine.
    pub url: String,

    /// Shared secret the engine presents on ingest calls (X-Runner-Token)
    /// and that we present when triggering runs.
    pub service_token: String,

    pub trigger_timeout_seconds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7710".to_string(),
            service_token: "openscouts_runner_token_please_change".to_string(),
            trigger_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat completion endpoint used by the scout configuration chat.
    pub completion_url: String,

    pub api_key: Option<String>,

    pub model: String,

    pub request_timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            completion_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Sessions whose email ends with this suffix get admin access.
    pub email_domain: String,

    pub user_page_size: u64,

    pub scout_scan_limit: u64,

    pub execution_scan_limit: u64,

    /// Concurrency cap for the per-user credit balance fan-out.
    pub credit_fetch_concurrency: usize,

    pub credit_fetch_timeout_seconds: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email_domain: "@openscouts.dev".to_string(),
            user_page_size: 1000,
            scout_scan_limit: 10_000,
            execution_scan_limit: 100_000,
            credit_fetch_concurrency: 8,
            credit_fetch_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub max_scouts_per_user: u64,

    /// Minimum minutes between manual runs of the same scout.
    pub manual_run_cooldown_minutes: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_scouts_per_user: 5,
            manual_run_cooldown_minutes: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "openscouts".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            firecrawl: FirecrawlConfig::default(),
            runner: RunnerConfig::default(),
            chat: ChatConfig::default(),
            admin: AdminConfig::default(),
            quota: QuotaConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Resolves the config file path: `OPENSCOUTS_CONFIG` if set, otherwise
    /// the platform config directory.
    #[must_use]
    pub fn path() -> PathBuf {
        if let Ok(path) = std::env::var("OPENSCOUTS_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("openscouts")
            .join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::path();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };

        if config.firecrawl.partner_key.is_none()
            && let Ok(key) = std::env::var("FIRECRAWL_API_KEY")
            && !key.is_empty()
        {
            config.firecrawl.partner_key = Some(key);
        }

        if let Ok(token) = std::env::var("OPENSCOUTS_RUNNER_TOKEN")
            && !token.is_empty()
        {
            config.runner.service_token = token;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.quota.max_scouts_per_user == 0 {
            anyhow::bail!("quota.max_scouts_per_user must be at least 1");
        }
        if self.admin.credit_fetch_concurrency == 0 {
            anyhow::bail!("admin.credit_fetch_concurrency must be at least 1");
        }
        if !self.admin.email_domain.starts_with('@') {
            anyhow::bail!("admin.email_domain must start with '@'");
        }
        if self.observability.loki_enabled {
            url::Url::parse(&self.observability.loki_url).context("Invalid Loki URL")?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        info!("Config written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_quota() {
        let mut config = Config::default();
        config.quota.max_scouts_per_user = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bare_admin_domain() {
        let mut config = Config::default();
        config.admin.email_domain = "openscouts.dev".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.quota.max_scouts_per_user, 5);
        assert_eq!(parsed.quota.manual_run_cooldown_minutes, 20u64);
    }
}
