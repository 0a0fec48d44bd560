//! Structural validation of model-produced schedule JSON.
//!
//! [`validate_schedule`] enforces the exact shape the planning prompt asks
//! for and nothing more: patterns for dates and times, types for the rest.
//! Semantic expectations the prompt delegates to the model (windows that
//! end after they start, real calendar dates, no duplicate activities) are
//! surfaced separately by [`check_invariants`] so the trust boundary shows
//! up in the logs instead of being silently assumed.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::schedule::types::ScheduleItem;

/// Pattern every calendar-date string must match.
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// Pattern every clock-time string must match.
pub const TIME_PATTERN: &str = r"^\d{2}:\d{2}$";

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("valid date regex"));
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(TIME_PATTERN).expect("valid time regex"));

/// First violation found when checking model output against the schedule
/// item shape. `path` points at the offending value, `expected` names the
/// pattern or type it failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: expected {expected}")]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `[2].start`.
    pub path: String,
    /// Pattern or type the value had to satisfy.
    pub expected: String,
}

fn violation(path: String, expected: impl Into<String>) -> SchemaViolation {
    SchemaViolation {
        path,
        expected: expected.into(),
    }
}

/// Validate a parsed JSON value as an ordered sequence of schedule items.
///
/// Fails on the first violation. Purely structural: see [`check_invariants`]
/// for the semantic checks this deliberately does not perform.
pub fn validate_schedule(value: &Value) -> Result<Vec<ScheduleItem>, SchemaViolation> {
    let Some(entries) = value.as_array() else {
        return Err(violation("$".to_owned(), "an array of schedule items"));
    };

    let mut items = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        items.push(validate_item(entry, idx)?);
    }
    Ok(items)
}

fn validate_item(value: &Value, idx: usize) -> Result<ScheduleItem, SchemaViolation> {
    let Some(obj) = value.as_object() else {
        return Err(violation(format!("[{idx}]"), "an object"));
    };

    let Some(dates) = obj.get("date").and_then(Value::as_array) else {
        return Err(violation(
            format!("[{idx}].date"),
            "a non-empty array of date strings",
        ));
    };
    if dates.is_empty() {
        return Err(violation(
            format!("[{idx}].date"),
            "a non-empty array of date strings",
        ));
    }

    let mut date = Vec::with_capacity(dates.len());
    for (di, entry) in dates.iter().enumerate() {
        match entry.as_str() {
            Some(text) if DATE_RE.is_match(text) => date.push(text.to_owned()),
            _ => return Err(violation(format!("[{idx}].date[{di}]"), DATE_PATTERN)),
        }
    }

    let start = time_field(obj, "start", idx)?;
    let end = time_field(obj, "end", idx)?;

    let activity = obj
        .get("activity")
        .and_then(Value::as_str)
        .ok_or_else(|| violation(format!("[{idx}].activity"), "a string"))?
        .to_owned();

    let is_daily = bool_field(obj, "isDaily", idx)?;
    let is_weekly = bool_field(obj, "isWeekly", idx)?;
    let is_monthly = bool_field(obj, "isMonthly", idx)?;

    Ok(ScheduleItem {
        date,
        start,
        end,
        activity,
        is_daily,
        is_weekly,
        is_monthly,
    })
}

fn time_field(obj: &Map<String, Value>, key: &str, idx: usize) -> Result<String, SchemaViolation> {
    match obj.get(key).and_then(Value::as_str) {
        Some(text) if TIME_RE.is_match(text) => Ok(text.to_owned()),
        _ => Err(violation(format!("[{idx}].{key}"), TIME_PATTERN)),
    }
}

fn bool_field(obj: &Map<String, Value>, key: &str, idx: usize) -> Result<bool, SchemaViolation> {
    obj.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| violation(format!("[{idx}].{key}"), "a boolean"))
}

// ---------------------------------------------------------------------------
// Semantic invariant report
// ---------------------------------------------------------------------------

/// One semantic problem in an otherwise well-formed schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// `end` is not after `start` within the same day.
    #[error("item {index}: window {start}..{end} ends before it starts")]
    WindowInverted {
        index: usize,
        start: String,
        end: String,
    },

    /// A date string matched the pattern but names no real calendar day.
    #[error("item {index}: {date} is not a calendar date")]
    ImpossibleDate { index: usize, date: String },

    /// `activity` is empty or whitespace.
    #[error("item {index}: activity name is blank")]
    BlankActivity { index: usize },

    /// Two items carry the same activity name.
    #[error("item {index}: duplicate activity {activity:?}")]
    DuplicateActivity { index: usize, activity: String },
}

/// Report the semantic expectations the structural validator does not
/// enforce. Never fails a request; callers log the report and keep going,
/// matching the contract that temporal correctness is the model's job.
#[must_use]
pub fn check_invariants(items: &[ScheduleItem]) -> Vec<InvariantViolation> {
    let mut report = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        // Zero-padded HH:mm strings order lexically and temporally alike.
        if item.end <= item.start {
            report.push(InvariantViolation::WindowInverted {
                index,
                start: item.start.clone(),
                end: item.end.clone(),
            });
        }

        for date in &item.date {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                report.push(InvariantViolation::ImpossibleDate {
                    index,
                    date: date.clone(),
                });
            }
        }

        let name = item.activity.trim();
        if name.is_empty() {
            report.push(InvariantViolation::BlankActivity { index });
        } else if seen.contains(&name) {
            report.push(InvariantViolation::DuplicateActivity {
                index,
                activity: item.activity.clone(),
            });
        } else {
            seen.push(name);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn item_json(start: &str, date: &str) -> Value {
        serde_json::json!({
            "date": [date],
            "start": start,
            "end": "10:00",
            "activity": "reading",
            "isDaily": false,
            "isWeekly": false,
            "isMonthly": false
        })
    }

    #[test]
    fn validate_accepts_conforming_items() {
        let value = serde_json::json!([
            {
                "date": ["2025-09-13", "2025-09-14"],
                "start": "07:00",
                "end": "08:30",
                "activity": "gym",
                "isDaily": true,
                "isWeekly": false,
                "isMonthly": false
            }
        ]);

        let items = validate_schedule(&value).expect("schedule validates");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].activity, "gym");
        assert_eq!(items[0].date.len(), 2);
        assert!(items[0].is_daily);
    }

    #[test]
    fn validate_ignores_unknown_fields() {
        let mut item = item_json("09:00", "2025-09-01");
        item["mood"] = Value::String("focused".to_owned());

        let items = validate_schedule(&Value::Array(vec![item])).expect("stray keys are dropped");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].activity, "reading");
    }

    #[test]
    fn validate_rejects_time_missing_leading_zero() {
        let value = Value::Array(vec![item_json("9:00", "2025-09-01")]);

        let err = validate_schedule(&value).expect_err("short time must fail");
        assert_eq!(err.path, "[0].start");
        assert_eq!(err.expected, TIME_PATTERN);
    }

    #[test]
    fn validate_rejects_date_missing_leading_zero() {
        let value = Value::Array(vec![item_json("09:00", "2025-9-1")]);

        let err = validate_schedule(&value).expect_err("short date must fail");
        assert_eq!(err.path, "[0].date[0]");
        assert_eq!(err.expected, DATE_PATTERN);
    }

    #[test]
    fn validate_rejects_non_array_root() {
        let value = serde_json::json!({ "schedule": [] });

        let err = validate_schedule(&value).expect_err("object root must fail");
        assert_eq!(err.path, "$");
    }

    #[test]
    fn validate_rejects_empty_date_array() {
        let mut item = item_json("09:00", "2025-09-01");
        item["date"] = Value::Array(Vec::new());

        let err = validate_schedule(&Value::Array(vec![item])).expect_err("empty dates must fail");
        assert_eq!(err.path, "[0].date");
    }

    #[test]
    fn validate_rejects_missing_recurrence_flag() {
        let mut item = item_json("09:00", "2025-09-01");
        item.as_object_mut().expect("object").remove("isWeekly");

        let err = validate_schedule(&Value::Array(vec![item])).expect_err("missing flag must fail");
        assert_eq!(err.path, "[0].isWeekly");
        assert_eq!(err.expected, "a boolean");
    }

    #[test]
    fn validate_reports_offending_index() {
        let good = item_json("09:00", "2025-09-01");
        let bad = item_json("25:xx", "2025-09-01");

        let err =
            validate_schedule(&Value::Array(vec![good, bad])).expect_err("second item must fail");
        assert_eq!(err.path, "[1].start");
    }

    #[test]
    fn invariants_pass_on_sound_schedule() {
        let value = serde_json::json!([
            {
                "date": ["2025-09-13"],
                "start": "07:00",
                "end": "08:00",
                "activity": "gym",
                "isDaily": false,
                "isWeekly": false,
                "isMonthly": false
            }
        ]);
        let items = validate_schedule(&value).expect("validates");

        assert!(check_invariants(&items).is_empty());
    }

    #[test]
    fn invariants_flag_inverted_window() {
        let mut item = parse_single(item_json("09:00", "2025-09-01"));
        item.end = "08:00".to_owned();

        let report = check_invariants(&[item]);
        assert!(matches!(
            report.as_slice(),
            [InvariantViolation::WindowInverted { index: 0, .. }]
        ));
    }

    #[test]
    fn invariants_flag_impossible_calendar_date() {
        // Matches the pattern, names no real day.
        let item = parse_single(item_json("09:00", "2025-02-30"));

        let report = check_invariants(&[item]);
        assert!(matches!(
            report.as_slice(),
            [InvariantViolation::ImpossibleDate { index: 0, .. }]
        ));
    }

    #[test]
    fn invariants_flag_duplicate_activity() {
        let a = parse_single(item_json("09:00", "2025-09-01"));
        let mut b = parse_single(item_json("11:00", "2025-09-01"));
        b.end = "12:00".to_owned();

        let report = check_invariants(&[a, b]);
        assert!(matches!(
            report.as_slice(),
            [InvariantViolation::DuplicateActivity { index: 1, .. }]
        ));
    }

    #[test]
    fn invariants_flag_blank_activity() {
        let mut item = parse_single(item_json("09:00", "2025-09-01"));
        item.activity = "   ".to_owned();

        let report = check_invariants(&[item]);
        assert!(matches!(
            report.as_slice(),
            [InvariantViolation::BlankActivity { index: 0 }]
        ));
    }

    fn parse_single(value: Value) -> ScheduleItem {
        let items = validate_schedule(&Value::Array(vec![value])).expect("fixture validates");
        items.into_iter().next().expect("one item")
    }
}
