//! HTTP boundary for the planning service.
//!
//! Four routes, one success envelope, one error responder. Handlers take
//! the request body as loose JSON and do their own field checks so every
//! 400 carries a caller-facing message instead of a deserializer trace.
//! The two upstream capabilities are injected through [`AppState`].

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::cloudkit::{RecordStore, VoteRecord};
use crate::completion::CompletionBackend;
use crate::config::PlannerDefaults;
use crate::error::{ApiError, Result};
use crate::schedule::prompt::{PromptContext, build_create_prompt, build_update_prompt};
use crate::schedule::{self, ScheduleEntry, ScheduleItem, reconcile, validate};

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
///
/// Both upstream clients sit behind trait objects so tests can inject
/// canned implementations.
#[derive(Clone)]
pub struct AppState {
    /// Planning-model capability.
    pub completion: Arc<dyn CompletionBackend>,
    /// Vote record-store capability.
    pub records: Arc<dyn RecordStore>,
    /// Planning-window defaults applied when a request omits them.
    pub planner: PlannerDefaults,
}

/// Success envelope wrapped around every 2xx payload.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Always `"Success"`.
    pub message: &'static str,
    /// Route-specific payload.
    pub data: T,
}

fn success<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        message: "Success",
        data,
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the service router with CORS, tracing, and the 404 fallback.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/schedule", post(create_schedule))
        .route("/update", post(update_schedule))
        .route("/test", get(test_server))
        .route("/vote", post(relay_vote))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /schedule`: build a schedule from a list of activities.
async fn create_schedule(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Envelope<Vec<ScheduleEntry>>>> {
    let body = body.map_or(Value::Null, |Json(v)| v);

    let activities = parse_activities(&body)?;
    let ctx = prompt_context(&state.planner, &body);
    let prompt = build_create_prompt(&ctx, &activities);

    let raw = state.completion.complete(&prompt).await?;
    let items = schedule::parse_model_schedule(&raw)?;
    log_invariants(&items);

    Ok(success(reconcile::create_schedule(items)))
}

/// `POST /update`: revise a schedule, re-attaching prior metadata.
async fn update_schedule(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Envelope<Vec<ScheduleEntry>>>> {
    let body = body.map_or(Value::Null, |Json(v)| v);

    let old_schedule = body.get("oldSchedule");
    let new_schedule = body.get("newSchedule");
    if is_effectively_empty(old_schedule) && is_effectively_empty(new_schedule) {
        return Err(ApiError::InvalidInput(
            "Please provide the previous schedule or the changes to apply.".to_owned(),
        ));
    }

    let prior = parse_prior_schedule(old_schedule)?;
    let old_json = match old_schedule {
        Some(value) if !is_effectively_empty(old_schedule) => value.to_string(),
        _ => "[]".to_owned(),
    };
    let instructions = instructions_text(new_schedule);

    let ctx = prompt_context(&state.planner, &body);
    let prompt = build_update_prompt(&ctx, &old_json, &instructions);

    let raw = state.completion.complete(&prompt).await?;
    let items = schedule::parse_model_schedule(&raw)?;
    log_invariants(&items);

    Ok(success(reconcile::reconcile(items, &prior)))
}

/// `GET /test`: liveness check.
async fn test_server() -> Json<Envelope<&'static str>> {
    success("works")
}

/// `POST /vote`: relay a vote to the record store.
async fn relay_vote(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Envelope<Value>>> {
    let body = body.map_or(Value::Null, |Json(v)| v);

    let vote = parse_vote(&body)?;
    let receipt = state.records.save_vote(&vote).await?;

    Ok(success(receipt))
}

/// Fallback for any request no route answers, including a known path
/// hit with the wrong method.
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found !")
}

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// Pull a non-empty list of activity strings out of the request body.
fn parse_activities(body: &Value) -> Result<Vec<String>> {
    let entries = body
        .get("activities")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| {
            ApiError::InvalidInput("Please enter the activities to schedule.".to_owned())
        })?;

    let mut activities = Vec::with_capacity(entries.len());
    for entry in entries {
        let text = entry.as_str().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(ApiError::InvalidInput(
                "Every activity must be a non-empty string.".to_owned(),
            ));
        }
        activities.push(text.to_owned());
    }
    Ok(activities)
}

/// Whether an update-request part carries no usable content.
///
/// Missing, `null`, blank strings, `[]`, and `{}` all count as empty;
/// anything else is content.
fn is_effectively_empty(part: Option<&Value>) -> bool {
    match part {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Deserialize the prior schedule, treating empty markers as no prior.
fn parse_prior_schedule(old_schedule: Option<&Value>) -> Result<Vec<ScheduleEntry>> {
    if is_effectively_empty(old_schedule) {
        return Ok(Vec::new());
    }
    match old_schedule {
        Some(value @ Value::Array(_)) => serde_json::from_value(value.clone()).map_err(|_| {
            ApiError::InvalidInput("oldSchedule must be an array of schedule entries.".to_owned())
        }),
        _ => Err(ApiError::InvalidInput(
            "oldSchedule must be an array of schedule entries.".to_owned(),
        )),
    }
}

/// The caller's edit instructions as prompt text.
fn instructions_text(new_schedule: Option<&Value>) -> String {
    match new_schedule {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Pull a vote out of the request body.
fn parse_vote(body: &Value) -> Result<VoteRecord> {
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    let Some(entries) = body.get("times").and_then(Value::as_array) else {
        return Err(ApiError::InvalidInput(
            "Please enter the name and times for the vote.".to_owned(),
        ));
    };
    if name.is_empty() {
        return Err(ApiError::InvalidInput(
            "Please enter the name and times for the vote.".to_owned(),
        ));
    }

    let mut times = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(text) = entry.as_str() else {
            return Err(ApiError::InvalidInput(
                "Every vote time must be a string.".to_owned(),
            ));
        };
        times.push(text.to_owned());
    }

    Ok(VoteRecord {
        name: name.to_owned(),
        times,
    })
}

/// Planning context for this request: UTC today plus the request's window
/// overrides, falling back to the configured defaults.
fn prompt_context(defaults: &PlannerDefaults, body: &Value) -> PromptContext {
    PromptContext::new(
        Utc::now().date_naive(),
        override_or(body, "wakeupTime", &defaults.wakeup_time),
        override_or(body, "sleepTime", &defaults.sleep_time),
        override_or(body, "productivityTime", &defaults.productive_hours),
    )
}

fn override_or(body: &Value, key: &str, fallback: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| fallback.to_owned(), str::to_owned)
}

fn log_invariants(items: &[ScheduleItem]) {
    for violation in validate::check_invariants(items) {
        warn!(%violation, "model schedule failed a sanity check");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    #[test]
    fn activities_parse_and_trim() {
        let body = json!({ "activities": ["  gym ", "write report"] });
        let activities = parse_activities(&body).unwrap();
        assert_eq!(activities, vec!["gym".to_owned(), "write report".to_owned()]);
    }

    #[test]
    fn missing_activities_mentions_the_field() {
        let err = parse_activities(&json!({})).unwrap_err();
        assert!(err.to_string().contains("activities"));
    }

    #[test]
    fn empty_activities_array_is_rejected() {
        let err = parse_activities(&json!({ "activities": [] })).unwrap_err();
        assert!(err.to_string().contains("activities"));
    }

    #[test]
    fn non_string_activity_is_rejected() {
        let err = parse_activities(&json!({ "activities": ["gym", 7] })).unwrap_err();
        assert!(err.to_string().contains("non-empty string"));
    }

    #[test]
    fn blank_activity_is_rejected() {
        assert!(parse_activities(&json!({ "activities": ["   "] })).is_err());
    }

    #[test]
    fn emptiness_markers() {
        assert!(is_effectively_empty(None));
        assert!(is_effectively_empty(Some(&Value::Null)));
        assert!(is_effectively_empty(Some(&json!(""))));
        assert!(is_effectively_empty(Some(&json!("   "))));
        assert!(is_effectively_empty(Some(&json!([]))));
        assert!(is_effectively_empty(Some(&json!({}))));

        assert!(!is_effectively_empty(Some(&json!(false))));
        assert!(!is_effectively_empty(Some(&json!(0))));
        assert!(!is_effectively_empty(Some(&json!(["x"]))));
        assert!(!is_effectively_empty(Some(&json!("move gym"))));
    }

    #[test]
    fn prior_schedule_empty_markers_mean_no_prior() {
        assert!(parse_prior_schedule(None).unwrap().is_empty());
        assert!(parse_prior_schedule(Some(&json!([]))).unwrap().is_empty());
        assert!(parse_prior_schedule(Some(&json!(""))).unwrap().is_empty());
    }

    #[test]
    fn prior_schedule_deserializes_entries() {
        let value = json!([{
            "date": ["2025-09-13"],
            "start": "07:00",
            "end": "08:00",
            "activity": "gym",
            "isDaily": false,
            "isWeekly": false,
            "isMonthly": false,
            "id": "abc",
            "description": "with Sam"
        }]);
        let prior = parse_prior_schedule(Some(&value)).unwrap();
        assert_eq!(prior.len(), 1);
        assert_eq!(prior[0].id, "abc");
        assert_eq!(prior[0].description, "with Sam");
        assert_eq!(prior[0].reminder, "quarter");
    }

    #[test]
    fn prior_schedule_rejects_non_arrays() {
        let err = parse_prior_schedule(Some(&json!("gym at 7"))).unwrap_err();
        assert!(err.to_string().contains("oldSchedule"));
    }

    #[test]
    fn instructions_accept_strings_and_structures() {
        assert_eq!(instructions_text(None), "");
        assert_eq!(instructions_text(Some(&Value::Null)), "");
        assert_eq!(instructions_text(Some(&json!("move gym to 08:00"))), "move gym to 08:00");
        assert_eq!(instructions_text(Some(&json!({ "add": "dentist" }))), r#"{"add":"dentist"}"#);
    }

    #[test]
    fn vote_parses_name_and_times() {
        let body = json!({ "name": " team lunch ", "times": ["12:00", "13:00"] });
        let vote = parse_vote(&body).unwrap();
        assert_eq!(vote.name, "team lunch");
        assert_eq!(vote.times, vec!["12:00".to_owned(), "13:00".to_owned()]);
    }

    #[test]
    fn vote_requires_name_and_times() {
        assert!(parse_vote(&json!({})).is_err());
        assert!(parse_vote(&json!({ "name": "lunch" })).is_err());
        assert!(parse_vote(&json!({ "name": "", "times": ["12:00"] })).is_err());
        assert!(parse_vote(&json!({ "name": "lunch", "times": "12:00" })).is_err());
    }

    #[test]
    fn vote_rejects_non_string_times() {
        let err = parse_vote(&json!({ "name": "lunch", "times": ["12:00", 13] })).unwrap_err();
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn window_overrides_beat_defaults() {
        let defaults = PlannerDefaults::default();
        let ctx = prompt_context(&defaults, &json!({ "wakeupTime": "07:30" }));
        assert_eq!(ctx.wakeup_time, "07:30");
        assert_eq!(ctx.sleep_time, defaults.sleep_time);
        assert_eq!(ctx.productive_hours, defaults.productive_hours);
    }

    #[test]
    fn blank_override_falls_back() {
        let defaults = PlannerDefaults::default();
        let ctx = prompt_context(&defaults, &json!({ "sleepTime": "  " }));
        assert_eq!(ctx.sleep_time, defaults.sleep_time);
    }

    #[test]
    fn envelope_shape() {
        let Json(envelope) = success("works");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "message": "Success", "data": "works" }));
    }

    #[tokio::test]
    async fn test_route_reports_works() {
        let Json(envelope) = test_server().await;
        assert_eq!(envelope.message, "Success");
        assert_eq!(envelope.data, "works");
    }
}
