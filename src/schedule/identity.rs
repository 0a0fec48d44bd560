//! Content-identity matching between schedule records.
//!
//! Two records describe the same logical activity only when every content
//! field matches exactly. Identity and user-owned metadata never enter the
//! comparison: [`ScheduleEntry::content`](crate::schedule::types::ScheduleEntry::content)
//! projects an entry down to its [`ScheduleItem`] before matching, so `id`,
//! `description`, `reminder`, and `isCurrent` are excluded by construction.

use crate::schedule::types::ScheduleItem;

/// Whether two items describe the same logical activity.
///
/// Strict equality over `date` (including order), `start`, `end`,
/// `activity`, and the recurrence markers. Deliberately no fuzzy matching
/// and no name normalization: a regenerated item keeps its prior identity
/// only when the model echoed its content back byte for byte, and any edit
/// makes it a new activity. That strictness is the contract, not a bug.
#[must_use]
pub fn same_activity(a: &ScheduleItem, b: &ScheduleItem) -> bool {
    a == b
}
