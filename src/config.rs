//! Environment configuration for the planning service.
//!
//! All deployment knobs come from the process environment (with `.env`
//! loading done by the binary before this module runs). Only the upstream
//! completion endpoint is mandatory; everything else has a default, so a
//! bare `UPSTREAM_API_URL`/`UPSTREAM_API_KEY` pair is enough to start.

use serde::{Deserialize, Serialize};

use crate::completion::DEFAULT_MODEL;
use crate::error::{ApiError, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CLOUDKIT_ENVIRONMENT: &str = "development";

/// Top-level configuration, assembled from the process environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Upstream chat-completion endpoint settings.
    pub upstream: UpstreamConfig,
    /// CloudKit record-store settings.
    pub cloudkit: RecordStoreConfig,
    /// Planning-window defaults used when a request omits them.
    pub planner: PlannerDefaults,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string handed to the TCP listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream chat-completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the OpenAI-compatible server.
    pub api_url: String,
    /// API key for the upstream endpoint.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model ID used for planning completions.
    pub model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

/// CloudKit record-store configuration.
///
/// Both the container and the token may be left empty; vote relaying then
/// fails at the record store while scheduling keeps working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    /// Container identifier, e.g. `iCloud.com.example.VoteApp`.
    pub container: String,
    /// CloudKit environment (`development` or `production`).
    pub environment: String,
    /// Server-to-server API token.
    #[serde(skip_serializing)]
    pub api_token: String,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            container: String::new(),
            environment: DEFAULT_CLOUDKIT_ENVIRONMENT.to_owned(),
            api_token: String::new(),
        }
    }
}

/// Planning-window defaults, overridable per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerDefaults {
    /// Start of the waking window, `HH:mm`.
    pub wakeup_time: String,
    /// End of the waking window, `HH:mm`.
    pub sleep_time: String,
    /// Window the user considers most productive.
    pub productive_hours: String,
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            wakeup_time: "06:00".to_owned(),
            sleep_time: "22:00".to_owned(),
            productive_hours: "09:00-12:00".to_owned(),
        }
    }
}

impl AppConfig {
    /// Assemble the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `UPSTREAM_API_URL` or `UPSTREAM_API_KEY` is
    /// missing or blank, or if `PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env_or("HOST", DEFAULT_HOST),
                port: env_port("PORT", DEFAULT_PORT)?,
            },
            upstream: UpstreamConfig {
                api_url: require_env("UPSTREAM_API_URL")?,
                api_key: require_env("UPSTREAM_API_KEY")?,
                model: env_or("UPSTREAM_MODEL", DEFAULT_MODEL),
            },
            cloudkit: RecordStoreConfig {
                container: env_or("CLOUDKIT_CONTAINER", ""),
                environment: env_or("CLOUDKIT_ENVIRONMENT", DEFAULT_CLOUDKIT_ENVIRONMENT),
                api_token: env_or("CLOUDKIT_API_TOKEN", ""),
            },
            planner: PlannerDefaults::default(),
        })
    }
}

/// Read an env var, falling back when it is unset or blank.
fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

/// Read a mandatory env var.
fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .map_err(|_| ApiError::Config(format!("required env var is missing: {key}")))?;
    if value.trim().is_empty() {
        return Err(ApiError::Config(format!(
            "required env var is empty: {key}"
        )));
    }
    Ok(value.trim().to_owned())
}

/// Read a port number env var, falling back when unset or blank.
fn env_port(key: &str, fallback: u16) -> Result<u16> {
    let Some(raw) = std::env::var(key).ok().filter(|v| !v.trim().is_empty()) else {
        return Ok(fallback);
    };
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{key} is not a valid port number: {raw}")))
}
