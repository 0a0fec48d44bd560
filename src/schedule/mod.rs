//! Schedule domain: wire types, model-output parsing, and reconciliation.
//!
//! The flow through this module is always the same. Raw model text is
//! cleaned by [`sanitize`], checked against the wire schema by
//! [`validate`], and the resulting content items are matched against a
//! prior schedule by [`reconcile`] so client-owned metadata survives a
//! round trip through the model.

pub mod identity;
pub mod prompt;
pub mod reconcile;
pub mod sanitize;
pub mod types;
pub mod validate;

use tracing::warn;

use crate::error::{ApiError, Result};

pub use types::{DEFAULT_REMINDER, ScheduleEntry, ScheduleItem};

/// Parse raw model output into validated schedule items.
///
/// Strips code fences, parses the remainder as JSON, and validates the
/// schema. Any failure maps to [`ApiError::UpstreamFormat`] carrying the
/// original raw text so callers can surface what the model actually said.
pub fn parse_model_schedule(raw: &str) -> Result<Vec<ScheduleItem>> {
    let cleaned = sanitize::clean_model_json(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|err| {
        warn!(error = %err, "model output is not valid JSON");
        ApiError::UpstreamFormat { raw: raw.to_owned() }
    })?;

    validate::validate_schedule(&value).map_err(|err| {
        warn!(path = %err.path, expected = %err.expected, "model output failed schema validation");
        ApiError::UpstreamFormat { raw: raw.to_owned() }
    })
}
