//! Prompt construction for the planning model.
//!
//! Deterministic string templating. The instruction text is a collaborator
//! contract with the external model: the rules below ask it to resolve
//! relative day words against the injected "today", keep recurrence flags
//! as markers, and answer with a bare JSON array in the exact shape the
//! validator accepts. Nothing here branches on content.

use chrono::NaiveDate;

/// Time context injected into every planning prompt.
///
/// `today` is resolved once at the HTTP boundary (UTC) and flows through
/// unmodified, so the date the model was told and the date the service
/// later interprets are always the same.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Calendar date the model must treat as "today".
    pub today: NaiveDate,
    /// Start of the user's waking window, `HH:mm`.
    pub wakeup_time: String,
    /// End of the user's waking window, `HH:mm`.
    pub sleep_time: String,
    /// Window the user considers most productive, free-form text.
    pub productive_hours: String,
}

impl PromptContext {
    /// Create a context for the given day and planning windows.
    pub fn new(
        today: NaiveDate,
        wakeup_time: impl Into<String>,
        sleep_time: impl Into<String>,
        productive_hours: impl Into<String>,
    ) -> Self {
        Self {
            today,
            wakeup_time: wakeup_time.into(),
            sleep_time: sleep_time.into(),
            productive_hours: productive_hours.into(),
        }
    }
}

/// Build the instruction text for generating a schedule from scratch.
#[must_use]
pub fn build_create_prompt(ctx: &PromptContext, activities: &[String]) -> String {
    let today = ctx.today.format("%Y-%m-%d").to_string();

    let mut prompt = String::new();
    prompt.push_str("[DATA]\n");
    prompt.push_str(&format!("Sleep time: {}\n", ctx.sleep_time));
    prompt.push_str(&format!("Wakeup time: {}\n", ctx.wakeup_time));
    prompt.push_str(&format!("Productive hours: {}\n", ctx.productive_hours));
    prompt.push_str("Activities:\n");
    for activity in activities {
        prompt.push_str(&format!("- {activity}\n"));
    }

    prompt.push_str("\n[RULES]\n");
    push_date_rules(&mut prompt, &today);
    push_shared_rules(&mut prompt, ctx);
    push_output_contract(&mut prompt, &today);

    prompt
}

/// Build the instruction text for revising an existing schedule.
///
/// The previous schedule is passed through as the caller sent it; the model
/// is asked to echo untouched items back with their content fields exactly
/// as they are, which is what lets the reconciler re-attach their metadata.
#[must_use]
pub fn build_update_prompt(
    ctx: &PromptContext,
    old_schedule_json: &str,
    instructions: &str,
) -> String {
    let today = ctx.today.format("%Y-%m-%d").to_string();

    let mut prompt = String::new();
    prompt.push_str("[DATA]\n");
    prompt.push_str(&format!("Today: {today}\n"));
    prompt.push_str(&format!("Current schedule (JSON): {old_schedule_json}\n"));
    prompt.push_str(&format!("Requested changes: {instructions}\n"));

    prompt.push_str("\n[RULES]\n");
    prompt.push_str("1. Apply the requested changes to the current schedule.\n");
    prompt.push_str(
        "2. Every item the changes do not touch must be echoed back with its \
         date, start, end, activity, and recurrence flags exactly as they are.\n",
    );
    push_date_rules(&mut prompt, &today);
    push_shared_rules(&mut prompt, ctx);
    push_output_contract(&mut prompt, &today);

    prompt
}

fn push_date_rules(prompt: &mut String, today: &str) {
    prompt.push_str(&format!(
        "* Schedule each listed activity exactly once, on the date its wording \
         calls for. The default date is today ({today}).\n",
    ));
    prompt.push_str(
        "* Words meaning tomorrow in any language (\"tomorrow\", \"besok\", \
         \"manana\", \"demain\") mean today plus one day; words meaning the day \
         after tomorrow (\"day after tomorrow\", \"lusa\", \"apres-demain\") mean \
         today plus two days.\n",
    );
    prompt.push_str(
        "* An explicit date in the wording (\"september 13\", \"13/09\", \
         \"2025-09-13\") is used as given, formatted as ISO YYYY-MM-DD.\n",
    );
    prompt.push_str(
        "* A weekday name (\"Monday\", \"Senin\", \"Lunes\", \"Montag\") means \
         the next occurrence of that weekday.\n",
    );
    prompt.push_str(
        "* Use \"isDaily\", \"isWeekly\", and \"isMonthly\" only as pattern \
         markers, never to pick dates: \"every day\" schedules once today with \
         \"isDaily\": true, \"every week\" once today with \"isWeekly\": true, \
         \"every month\" once today with \"isMonthly\": true.\n",
    );
}

fn push_shared_rules(prompt: &mut String, ctx: &PromptContext) {
    prompt.push_str("* No activity may appear more than once in the output array.\n");
    prompt.push_str(&format!(
        "* Keep every item between the wakeup time ({}) and the sleep time ({}).\n",
        ctx.wakeup_time, ctx.sleep_time,
    ));
    prompt.push_str(&format!(
        "* Place productive work inside the productive hours ({}) when possible.\n",
        ctx.productive_hours,
    ));
    prompt.push_str(
        "* Group out-of-home activities together so trips are efficient (for \
         example shopping, laundry, and visiting a friend).\n",
    );
    prompt.push_str("* Do not fill empty gaps; jump straight to the next activity.\n");
}

fn push_output_contract(prompt: &mut String, today: &str) {
    prompt.push_str(&format!(
        "* Every \"date\" value must be in ISO YYYY-MM-DD form; today is {today}.\n",
    ));
    prompt.push_str(
        "* The output must be a JSON array in exactly this shape, with no text \
         outside the array:\n\
         [\n  { \"date\": [\"YYYY-MM-DD\"], \"start\": \"HH:mm\", \"end\": \"HH:mm\", \
         \"activity\": \"...\", \"isDaily\": true/false, \"isWeekly\": true/false, \
         \"isMonthly\": true/false }\n]\n",
    );
}
