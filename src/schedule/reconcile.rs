//! Identity-preserving schedule merge.
//!
//! The planning model regenerates content fields wholesale on every call,
//! so correlation with the previous schedule is re-established here: each
//! freshly validated item is classified against the caller-supplied prior
//! schedule by content identity, then mapped to an entry that either
//! carries the matched metadata forward or starts from fresh defaults.
//! The classification is a pure function of its inputs; there is no hidden
//! state and no I/O.

use uuid::Uuid;

use crate::schedule::identity::same_activity;
use crate::schedule::types::{DEFAULT_REMINDER, ScheduleEntry, ScheduleItem};

/// How one freshly generated item relates to the prior schedule.
#[derive(Debug)]
enum Placement<'a> {
    /// Content-identical to a prior entry; its metadata carries over.
    Matched(&'a ScheduleEntry),
    /// No prior entry has this content; fresh identity is minted.
    New,
}

/// Linear scan, first match wins. Schedules are tens of items, so the
/// O(n*m) matcher cost is taken deliberately instead of building an index.
fn classify<'a>(item: &ScheduleItem, prior: &'a [ScheduleEntry]) -> Placement<'a> {
    prior
        .iter()
        .find(|entry| same_activity(item, entry.content()))
        .map_or(Placement::New, Placement::Matched)
}

/// Merge freshly validated model output against the caller's prior schedule.
///
/// Output order is model-output order and every output row corresponds to
/// one input item: prior entries the model did not echo back are dropped.
/// A matched item keeps the prior entry's `id`, `description`, and
/// `reminder`; an unmatched item gets a fresh id and defaults. `isCurrent`
/// is reset on every row regardless.
#[must_use]
pub fn reconcile(items: Vec<ScheduleItem>, prior: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
    items
        .into_iter()
        .map(|item| match classify(&item, prior) {
            Placement::Matched(matched) => ScheduleEntry {
                // Prior rows that predate ids still get one minted here, so
                // every entry leaving the reconciler is addressable.
                id: if matched.id.is_empty() {
                    mint_id()
                } else {
                    matched.id.clone()
                },
                description: matched.description.clone(),
                reminder: matched.reminder.clone(),
                is_current: false,
                item,
            },
            Placement::New => ScheduleEntry {
                id: mint_id(),
                description: String::new(),
                reminder: DEFAULT_REMINDER.to_owned(),
                is_current: false,
                item,
            },
        })
        .collect()
}

/// Attach fresh identity to a schedule generated with no prior state.
#[must_use]
pub fn create_schedule(items: Vec<ScheduleItem>) -> Vec<ScheduleEntry> {
    reconcile(items, &[])
}

fn mint_id() -> String {
    Uuid::new_v4().to_string()
}
