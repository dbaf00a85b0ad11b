//! Configuration loading and management

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable naming a YAML configuration file
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";
pub const BIND_ENV: &str = "DASHBOARD_BIND";
pub const DATABASE_URL_ENV: &str = "POSTGRES_URL";
pub const SEED_ENV: &str = "DASHBOARD_SEED";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "127.0.0.1:3000")
    pub bind: String,

    /// Buffered events per subscriber before it lags
    pub event_bus_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            event_bus_capacity: 1024,
        }
    }
}

/// Which store backs the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,

    /// Connection URL, required for the postgres backend
    pub url: Option<String>,

    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            url: None,
            max_connections: 5,
        }
    }
}

/// Sign-in and route-protection settings
///
/// Built once at startup and handed to the credentials provider and the
/// auth middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where unauthenticated requests are sent
    pub sign_in_page: String,

    /// Path prefix that requires a session
    pub protected_prefix: String,

    /// Landing page after sign-in when no redirect target is given
    pub home_page: String,

    pub session_cookie: String,

    pub session_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sign_in_page: "/login".to_string(),
            protected_prefix: "/dashboard".to_string(),
            home_page: "/dashboard".to_string(),
            session_cookie: "dashboard_session".to_string(),
            session_ttl_minutes: 24 * 60,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,

    /// Load placeholder data into the store at startup
    pub seed: bool,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `DASHBOARD_CONFIG` (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    ///
    /// Setting `POSTGRES_URL` also switches the backend to postgres.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }

        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.database.url = Some(url);
            self.database.backend = StorageBackend::Postgres;
        }

        if let Some(seed) = lookup(SEED_ENV) {
            self.seed = match seed.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(invalid_value(SEED_ENV, format!("expected a boolean, got '{}'", other)));
                }
            };
        }

        Ok(())
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(invalid_value(
                "database.url",
                format!("required for the postgres backend (or set {})", DATABASE_URL_ENV),
            ));
        }
        for (field, path) in [
            ("auth.sign_in_page", &self.auth.sign_in_page),
            ("auth.protected_prefix", &self.auth.protected_prefix),
            ("auth.home_page", &self.auth.home_page),
        ] {
            if !path.starts_with('/') {
                return Err(invalid_value(field, "must start with '/'"));
            }
        }
        if self.auth.session_ttl_minutes <= 0 {
            return Err(invalid_value("auth.session_ttl_minutes", "must be positive"));
        }
        Ok(())
    }
}

fn invalid_value(field: &str, message: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}
