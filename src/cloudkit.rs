//! CloudKit web-services client for vote records.
//!
//! Votes are relayed to a CloudKit public database with a single `create`
//! operation against the `records/modify` endpoint. The service stores
//! nothing itself; CloudKit's confirmation payload is passed back to the
//! caller untouched, and so is its error payload on failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};

/// CloudKit web-services endpoint root.
pub const DEFAULT_CLOUDKIT_BASE_URL: &str = "https://api.apple-cloudkit.com";

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The one capability the gateway needs from the record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a vote record and return the store's confirmation payload.
    async fn save_vote(&self, vote: &VoteRecord) -> Result<Value>;
}

/// A vote to relay: a name and the time slots it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Display name the vote is filed under.
    pub name: String,
    /// Time slots voted for, free-form strings.
    pub times: Vec<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Configuration for the CloudKit client.
#[derive(Clone)]
pub struct CloudKitConfig {
    /// Container identifier, e.g. `iCloud.com.example.VoteApp`.
    pub container: String,
    /// CloudKit environment (`development` or `production`).
    pub environment: String,
    /// Server-to-server API token, sent as the `ckAPIToken` query parameter.
    pub api_token: String,
    /// Endpoint root, overridable for tests.
    pub base_url: String,
}

impl CloudKitConfig {
    /// Create a new config for the given container, environment, and token.
    pub fn new(
        container: impl Into<String>,
        environment: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            environment: environment.into(),
            api_token: api_token.into(),
            base_url: DEFAULT_CLOUDKIT_BASE_URL.to_owned(),
        }
    }

    /// Set a custom endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl std::fmt::Debug for CloudKitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudKitConfig")
            .field("container", &self.container)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// CloudKit web-services client for the public database.
#[derive(Debug, Clone)]
pub struct CloudKitClient {
    config: CloudKitConfig,
    client: reqwest::Client,
}

impl CloudKitClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CloudKitConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// The `records/modify` endpoint for the configured container.
    fn modify_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!(
            "{base}/database/1/{}/{}/public/records/modify",
            self.config.container, self.config.environment,
        )
    }
}

/// Build the `records/modify` body for a single vote create operation.
///
/// CloudKit wraps every field in a `{"value": …}` envelope.
fn vote_operation_body(vote: &VoteRecord) -> Value {
    serde_json::json!({
        "operations": [
            {
                "operationType": "create",
                "record": {
                    "recordType": "Vote",
                    "fields": {
                        "name": { "value": vote.name },
                        "times": { "value": vote.times },
                    },
                },
            }
        ]
    })
}

#[async_trait]
impl RecordStore for CloudKitClient {
    async fn save_vote(&self, vote: &VoteRecord) -> Result<Value> {
        let body = vote_operation_body(vote);

        let response = self
            .client
            .post(self.modify_url())
            .query(&[("ckAPIToken", &self.config.api_token)])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("record store request failed: {e}")))?;

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        // The caller sees CloudKit's payload either way; errors keep the
        // store's own JSON so nothing is lost in translation.
        let payload =
            serde_json::from_str(&body_text).unwrap_or_else(|_| Value::String(body_text));

        if status.is_success() {
            Ok(payload)
        } else {
            Err(ApiError::RecordStore(payload))
        }
    }
}
