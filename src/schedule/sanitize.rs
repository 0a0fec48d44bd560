//! Model-output cleanup.
//!
//! The planning model is asked for a bare JSON array but will sometimes wrap
//! it in a markdown code fence anyway. [`clean_model_json`] strips the fence
//! so the result can go straight to a strict JSON parse.

/// Strip a surrounding markdown code fence from raw model output.
///
/// Trims whitespace; if the text opens with a ``` fence the whole fence line
/// is dropped (including an optional language tag), and a trailing closing
/// fence is removed. Best-effort only: the output is not guaranteed to be
/// valid JSON, downstream parsing is the detection point.
#[must_use]
pub fn clean_model_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Everything up to the first newline belongs to the fence line
    // ("```json" and friends).
    let body = match after_open.split_once('\n') {
        Some((_, rest)) => rest,
        None => after_open,
    };

    let body = body.trim();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim_end()
}
