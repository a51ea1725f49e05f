use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::order::Clock;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Sources, later wins:
// 1. built-in defaults
// 2. JSON file (`ORDER_API_CONFIG`, else `config.json` when present)
// 3. `ORDER_API_*` environment variables
//
// ============================================================================

pub const CONFIG_PATH_VAR: &str = "ORDER_API_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "ORDER_API_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "redis_address")]
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Prepended to every Redis key, e.g. `"prod:"`.
    pub key_prefix: String,
    pub page_size: usize,
    /// Civil offset for all order timestamps, minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Ids drawn per create before a collision is reported.
    pub create_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            key_prefix: String::new(),
            page_size: 50,
            utc_offset_minutes: -180,
            create_attempts: 3,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Apply `ORDER_API_<FIELD>` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("REDIS_URL") {
            self.redis_url = value;
        }
        if let Some(value) = var("SERVER_HOST") {
            self.server_host = value;
        }
        if let Some(value) = var("SERVER_PORT") {
            self.server_port = parse_var("SERVER_PORT", &value)?;
        }
        if let Some(value) = var("KEY_PREFIX") {
            self.key_prefix = value;
        }
        if let Some(value) = var("PAGE_SIZE") {
            self.page_size = parse_var("PAGE_SIZE", &value)?;
        }
        if let Some(value) = var("UTC_OFFSET_MINUTES") {
            self.utc_offset_minutes = parse_var("UTC_OFFSET_MINUTES", &value)?;
        }
        if let Some(value) = var("CREATE_ATTEMPTS") {
            self.create_attempts = parse_var("CREATE_ATTEMPTS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_url.trim().is_empty() {
            return Err(invalid("redis_url", "must not be empty"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be greater than zero"));
        }
        if self.create_attempts == 0 {
            return Err(invalid("create_attempts", "must be at least one"));
        }
        if Clock::from_offset_minutes(self.utc_offset_minutes).is_none() {
            return Err(invalid("utc_offset_minutes", "must be within ±24h"));
        }
        Ok(())
    }

    /// Redis connection URL; a bare `host:port` gets the `redis://` scheme.
    pub fn redis_connection_url(&self) -> String {
        let url = self.redis_url.trim();
        if url.contains("://") {
            url.to_string()
        } else {
            format!("redis://{}", url)
        }
    }

    pub fn clock(&self) -> Result<Clock, ConfigError> {
        Clock::from_offset_minutes(self.utc_offset_minutes)
            .ok_or_else(|| invalid("utc_offset_minutes", "must be within ±24h"))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: format!("{}{}", ENV_PREFIX, name),
        message: e.to_string(),
    })
}
