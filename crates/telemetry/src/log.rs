//! Append-only event log scoped to a single run.

use crate::model::{EventMeta, TelemetryEvent};
use chrono::Utc;
use std::time::Instant;

/// The telemetry log for one agent run.
///
/// Created at run entry and mutated only by the run that owns it. Every
/// event is also mirrored to `tracing` at debug level.
#[derive(Debug)]
pub struct TelemetryLog {
    /// Monotonic origin for `at_ms`.
    started: Instant,
    events: Vec<TelemetryEvent>,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            events: Vec::new(),
        }
    }

    /// Append an event with no metadata.
    pub fn record(&mut self, kind: &str) {
        self.push(kind, None);
    }

    /// Append an event with metadata. Non-object values are stored under
    /// a `value` key.
    pub fn record_with(&mut self, kind: &str, meta: serde_json::Value) {
        let meta = match meta {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = EventMeta::new();
                map.insert("value".into(), other);
                map
            }
        };
        self.push(kind, Some(meta));
    }

    fn push(&mut self, kind: &str, meta: Option<EventMeta>) {
        let at_ms = self.started.elapsed().as_millis() as u64;
        tracing::debug!(target: "baton::telemetry", kind, at_ms, meta = ?meta, "event");
        self.events.push(TelemetryEvent {
            kind: kind.to_string(),
            at_ms,
            recorded_at: Utc::now(),
            meta,
        });
    }

    /// An owned copy of every event so far, in emission order.
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.events.clone()
    }

    /// Kinds of every event so far, in emission order.
    pub fn kinds(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.kind.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}
