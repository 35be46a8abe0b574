//! Error types for the Baton domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum.

use thiserror::Error;

/// The top-level error type of an agent run.
///
/// Only planner and model-call failures escape a run. Tool failures are
/// recorded into the step list instead of surfacing here.
#[derive(Debug, Error)]
pub enum Error {
    // --- Language-model client errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Planner errors ---
    #[error("Planner error: {0}")]
    Planner(#[from] PlanError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Chat request failed: {0}")]
    Request(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("Planning failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool execution timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failure reported by a memory store backend.
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failure of the minimal required-keys argument check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("Missing required arg: {0}")]
    MissingRequired(String),
}
