use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub classifier: ClassifierConfig,

    pub auth: AuthConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// Complaints per page in listings (default: 20)
    pub records_per_page: u64,

    /// Recent complaints shown on the statistics dashboard (default: 10)
    pub recent_limit: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/complainr.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            records_per_page: 20,
            recent_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local
    /// development without HTTPS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of the external priority-classification service.
    pub url: String,

    /// Request timeout in seconds (default: 30). A slow classifier delays
    /// the submission response up to this bound; it never fails it.
    pub timeout_seconds: u64,

    /// Model version recorded when the classifier response omits one or
    /// the call falls back to the default prediction.
    pub fallback_model_version: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_seconds: 30,
            fallback_model_version: "v1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Idle timeout for sessions in seconds (default: 3600 = 1 hour)
    pub session_timeout_seconds: u64,

    /// How often the expired-session sweep runs (default: 300 = 5 minutes)
    pub sweep_interval_seconds: u64,

    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_seconds: 3600,
            sweep_interval_seconds: 300,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            classifier: ClassifierConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    fn config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/complainr/config.toml"),
        ]
    }

    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Deployment parameters come from the environment when present, so a
    /// container can run without a config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("COMPLAINR_DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Ok(url) = std::env::var("COMPLAINR_CLASSIFIER_URL") {
            self.classifier.url = url;
        }
        if let Ok(port) = std::env::var("COMPLAINR_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.records_per_page == 0 {
            anyhow::bail!("general.records_per_page must be at least 1");
        }
        if self.classifier.timeout_seconds == 0 {
            anyhow::bail!("classifier.timeout_seconds must be at least 1");
        }
        if self.auth.session_timeout_seconds < 60 {
            anyhow::bail!("auth.session_timeout_seconds must be at least 60");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.records_per_page, 20);
        assert_eq!(config.auth.session_timeout_seconds, 3600);
        assert_eq!(config.classifier.timeout_seconds, 30);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [classifier]
            url = "http://ml:5000"
            timeout_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.classifier.url, "http://ml:5000");
        assert_eq!(config.classifier.timeout_seconds, 5);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn rejects_zero_page_size() {
        let mut config = Config::default();
        config.general.records_per_page = 0;
        assert!(config.validate().is_err());
    }
}
