//! Data model for telemetry events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form structured metadata attached to an event.
pub type EventMeta = serde_json::Map<String, serde_json::Value>;

/// Event kinds emitted by the orchestrator, in the order a run can emit them.
pub mod kinds {
    pub const AGENT_START: &str = "agent.start";
    pub const AGENT_PLAN: &str = "agent.plan";
    pub const LLM_TOKEN: &str = "llm.token";
    pub const LLM_CHAT: &str = "llm.chat";
    pub const TOOL_START: &str = "tool.start";
    pub const TOOL_END: &str = "tool.end";
    pub const TOOL_ERROR: &str = "tool.error";
}

/// A timestamped, typed record of something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Dotted event kind, e.g. `tool.start`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Monotonic milliseconds since the run started.
    pub at_ms: u64,
    /// Wall-clock time the event was recorded.
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMeta>,
}

impl TelemetryEvent {
    /// Look up a metadata field.
    pub fn meta_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.as_ref().and_then(|m| m.get(key))
    }

    /// Look up a string metadata field.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta_value(key).and_then(|v| v.as_str())
    }
}
