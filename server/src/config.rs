//! Server configuration loaded from the environment.
//!
//! A `.env` file is honoured when present (loaded in `main` via `dotenvy`).
//!
//! | Variable                | Default                         |
//! |-------------------------|---------------------------------|
//! | `DATABASE_URL`          | required                        |
//! | `BIND_ADDR`             | `0.0.0.0`                       |
//! | `HTTP_PORT`             | `8000`                          |
//! | `METRICS_PORT`          | `9000`                          |
//! | `CHATBOT_FALLBACK_MODE` | `local`                         |
//! | `ANTHROPIC_API_KEY`     | unset (forces local mode)       |
//! | `ANTHROPIC_MODEL`       | client default model            |
//! | `CHATBOT_TIMEOUT_SECS`  | `10`                            |
//! | `KNOWLEDGE_FILE`        | unset (knowledge from database) |
//! | `DB_MAX_CONNECTIONS`    | `10`                            |

use dudu_hub_anthropic::messages::DEFAULT_MODEL;
use dudu_hub_core::config::{ChatbotConfig, ResponseMode};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(&'static str),

    /// Variable present but not parseable
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// Values parse but do not make sense together
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Everything the server binary needs to start.
#[derive(Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL
    pub database_url: String,
    /// Maximum pool connections
    pub db_max_connections: u32,
    /// Address the HTTP and metrics listeners bind to
    pub bind_addr: IpAddr,
    /// HTTP API port
    pub http_port: u16,
    /// Prometheus scrape port
    pub metrics_port: u16,
    /// Requested response mode
    pub mode: ResponseMode,
    /// Anthropic API key; absent means local mode
    pub anthropic_api_key: Option<String>,
    /// Anthropic model name
    pub anthropic_model: String,
    /// Upper bound on one completion call
    pub completion_timeout: Duration,
    /// Knowledge JSON file, instead of the `chatbot_knowledge` table
    pub knowledge_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing, a value
    /// cannot be parsed, or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::EnvVarNotSet("DATABASE_URL"))?;

        let mode = match get("CHATBOT_FALLBACK_MODE") {
            Some(value) => ResponseMode::parse(&value).ok_or(ConfigError::InvalidValue {
                var: "CHATBOT_FALLBACK_MODE",
                value,
            })?,
            None => ResponseMode::Local,
        };

        let config = Self {
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            bind_addr: parse_or(&get, "BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            http_port: parse_or(&get, "HTTP_PORT", 8000)?,
            metrics_port: parse_or(&get, "METRICS_PORT", 9000)?,
            mode,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            completion_timeout: Duration::from_secs(parse_or(&get, "CHATBOT_TIMEOUT_SECS", 10)?),
            knowledge_file: get("KNOWLEDGE_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(ConfigError::ValidationError(
                "DATABASE_URL must be a postgres:// URL".to_string(),
            ));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        if self.http_port == self.metrics_port {
            return Err(ConfigError::ValidationError(format!(
                "HTTP_PORT and METRICS_PORT must differ (both {})",
                self.http_port
            )));
        }

        if self.completion_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "CHATBOT_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Mode actually used: assisted needs an API key.
    #[must_use]
    pub const fn effective_mode(&self) -> ResponseMode {
        match (self.mode, &self.anthropic_api_key) {
            (ResponseMode::Assisted, Some(_)) => ResponseMode::Assisted,
            _ => ResponseMode::Local,
        }
    }

    /// Orchestrator configuration derived from these settings.
    #[must_use]
    pub fn chatbot_config(&self) -> ChatbotConfig {
        ChatbotConfig::new(self.effective_mode()).with_completion_timeout(self.completion_timeout)
    }

    /// HTTP API listen address.
    #[must_use]
    pub const fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// Metrics listen address.
    #[must_use]
    pub const fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.metrics_port)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("db_max_connections", &self.db_max_connections)
            .field("bind_addr", &self.bind_addr)
            .field("http_port", &self.http_port)
            .field("metrics_port", &self.metrics_port)
            .field("mode", &self.mode)
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("anthropic_model", &self.anthropic_model)
            .field("completion_timeout", &self.completion_timeout)
            .field("knowledge_file", &self.knowledge_file)
            .finish_non_exhaustive()
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}
