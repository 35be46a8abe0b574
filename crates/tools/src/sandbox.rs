//! Timeout-bounded, output-capped execution of a single tool call.
//!
//! The call future races a `tokio::time::timeout`. When the timer wins the
//! future is dropped, which cancels it at its next suspension point; tools
//! that spawn processes with `kill_on_drop` have those processes killed too.

use baton_core::error::ToolError;
use baton_core::tool::{Tool, ToolContext};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default wall-clock limit per tool call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default ceiling on recorded tool output, in bytes.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 262_144;

/// Appended to output that was cut at the byte ceiling.
pub const TRUNCATION_MARKER: &str = "\n[[TRUNCATED]]";

/// Limits applied to every sandboxed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxOptions {
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Race `call` against `timeout`.
///
/// Returns the call's own result if it settles first. Otherwise the call is
/// dropped and a [`ToolError::Timeout`] is returned as soon as the timer
/// fires.
pub async fn execute_with_timeout<T, F>(
    tool_name: &str,
    timeout: Duration,
    call: F,
) -> Result<T, ToolError>
where
    F: Future<Output = Result<T, ToolError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(tool = %tool_name, timeout_ms = timeout.as_millis() as u64, "Tool call timed out, cancelled");
            Err(ToolError::Timeout {
                tool_name: tool_name.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Truncate `output` to at most `max_bytes` bytes of UTF-8, then append
/// [`TRUNCATION_MARKER`].
///
/// The cut backs off to the previous character boundary so no partial
/// multi-byte sequence survives. Only the pre-marker slice is bounded: the
/// result can exceed `max_bytes` by the marker's length. Capping already
/// capped output is not idempotent.
pub fn cap_output(output: &str, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output.to_string();
    }
    let mut cut = max_bytes;
    while !output.is_char_boundary(cut) {
        cut -= 1;
    }
    debug!(original_bytes = output.len(), kept_bytes = cut, "Tool output truncated");
    format!("{}{}", &output[..cut], TRUNCATION_MARKER)
}

/// Runs tool calls under fixed [`SandboxOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sandbox {
    options: SandboxOptions,
}

impl Sandbox {
    pub fn new(options: SandboxOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> SandboxOptions {
        self.options
    }

    /// Execute `tool` and return its rendered, capped output.
    pub async fn run(
        &self,
        tool: &dyn Tool,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let output = execute_with_timeout(
            tool.name(),
            self.options.timeout,
            tool.execute(arguments, ctx),
        )
        .await?;
        Ok(cap_output(&output.render(), self.options.max_output_bytes))
    }
}
