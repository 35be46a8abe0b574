//! Extraction of a structured plan from free model text.
//!
//! The model may end its reply with `Steps:` followed by a JSON array of
//! `{name, tool?, args?}` objects. Anything else means "no plan".

use baton_core::tool::ToolCall;
use serde_json::Value;
use tracing::debug;

/// Text that introduces a plan in a model reply.
pub const STEPS_MARKER: &str = "Steps:";

/// Pull the parsed steps out of `text`, or `None` if there is no usable plan.
///
/// The first `Steps:` that is followed (after optional whitespace) by `[`
/// is taken, and the array runs to the last `]` in the text. Malformed JSON
/// yields `None` rather than an error. Elements are read one by one, so a
/// badly shaped element never discards the rest of the plan.
pub fn try_parse_steps(text: &str) -> Option<Vec<ToolCall>> {
    let candidate = text.match_indices(STEPS_MARKER).find_map(|(at, marker)| {
        let rest = text[at + marker.len()..].trim_start();
        if !rest.starts_with('[') {
            return None;
        }
        let end = rest.rfind(']')?;
        Some(&rest[..=end])
    })?;

    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(elements) => Some(elements.into_iter().map(step_from_value).collect()),
        Err(e) => {
            debug!(error = %e, "Reply has a Steps marker but no parseable plan");
            None
        }
    }
}

/// Read one plan element.
///
/// A non-object element becomes a step without a tool. A non-string `name`
/// is rendered as JSON (`null` becomes empty). A `tool` that is `null`,
/// `false`, `0` or `""` means no tool; any other non-string value is
/// rendered as JSON and will not match a registered tool.
fn step_from_value(value: Value) -> ToolCall {
    let Value::Object(mut fields) = value else {
        return ToolCall {
            name: String::new(),
            tool: None,
            args: None,
        };
    };

    let name = match fields.remove("name") {
        Some(Value::String(name)) => name,
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };

    let tool = match fields.remove("tool") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(tool)) if tool.is_empty() => None,
        Some(Value::String(tool)) => Some(tool),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(other) => Some(other.to_string()),
    };

    let args = fields.remove("args").filter(|a| !a.is_null());

    ToolCall { name, tool, args }
}
