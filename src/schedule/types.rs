//! Schedule data model.

use serde::{Deserialize, Serialize};

/// Reminder setting assigned to newly minted schedule entries.
pub const DEFAULT_REMINDER: &str = "quarter";

/// One scheduled activity occurrence as produced by the planning model.
///
/// This is the validated content shape: no identity, no user-owned
/// metadata. Derived equality over these fields is the canonical
/// content-identity comparison used when reconciling schedules, so any
/// change to a field here (including `date` order) makes an item a
/// different activity. The recurrence markers are informational only and
/// never expand `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    /// Every day this occurrence lands on, as `YYYY-MM-DD` strings.
    pub date: Vec<String>,
    /// Start of the time window, `HH:mm`.
    pub start: String,
    /// End of the time window, `HH:mm`.
    pub end: String,
    /// Display name of the activity.
    pub activity: String,
    /// Marks an activity the user repeats every day.
    pub is_daily: bool,
    /// Marks an activity the user repeats every week.
    pub is_weekly: bool,
    /// Marks an activity the user repeats every month.
    pub is_monthly: bool,
}

/// A schedule item enriched with identity and user-owned metadata.
///
/// Produced by the reconciler and accepted back as the caller-supplied
/// prior schedule on update. Metadata fields default when absent so
/// payloads predating a field still deserialize; identity matching never
/// reads them anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Content fields, inlined on the wire.
    #[serde(flatten)]
    pub item: ScheduleItem,
    /// Stable opaque identifier, minted once when the activity first
    /// appears and carried across updates while its content is unchanged.
    #[serde(default)]
    pub id: String,
    /// Free-text note owned by the user; never produced by the model.
    #[serde(default)]
    pub description: String,
    /// Reminder lead setting. Only observed value is [`DEFAULT_REMINDER`].
    #[serde(default = "default_reminder")]
    pub reminder: String,
    /// Whether this entry is the one currently in progress. Reset to
    /// `false` on every merge; clients flip it at display time.
    #[serde(default)]
    pub is_current: bool,
}

fn default_reminder() -> String {
    DEFAULT_REMINDER.to_owned()
}

impl ScheduleEntry {
    /// Content projection used for identity matching. Metadata is excluded
    /// by construction, not by runtime filtering.
    #[must_use]
    pub fn content(&self) -> &ScheduleItem {
        &self.item
    }
}
