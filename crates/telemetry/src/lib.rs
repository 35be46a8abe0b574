//! Run-scoped telemetry for Baton.
//!
//! Every agent run owns one append-only [`TelemetryLog`]. Events are
//! stamped with a monotonic offset from the start of the run, so their
//! order in the log is the causal order in which the orchestrator emitted
//! them. Callers only ever receive owned snapshots.

pub mod log;
pub mod model;

pub use log::TelemetryLog;
pub use model::{EventMeta, TelemetryEvent, kinds};
