//! Memory search tool — lets a plan step query the run's memory store.
//!
//! The store comes from the `ToolContext` of the call, unless one was
//! injected when the tool was built.

use async_trait::async_trait;
use baton_core::error::ToolError;
use baton_core::memory::{DEFAULT_SEARCH_LIMIT, MemoryStore};
use baton_core::tool::{Tool, ToolContext, ToolOutput};
use std::sync::Arc;

/// Upper bound on `k` accepted from arguments.
const MAX_RESULTS: u64 = 50;

/// A tool that searches a memory store.
pub struct MemorySearchTool {
    backend: Option<Arc<dyn MemoryStore>>,
    default_limit: usize,
}

impl Default for MemorySearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySearchTool {
    /// Search whatever store the run supplies.
    pub fn new() -> Self {
        Self {
            backend: None,
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Always search `backend`, ignoring the run's store.
    pub fn with_backend(backend: Arc<dyn MemoryStore>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::new()
        }
    }

    /// Result count used when a call does not pass `k`.
    pub fn with_default_limit(mut self, k: usize) -> Self {
        self.default_limit = k.clamp(1, MAX_RESULTS as usize);
        self
    }
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        "memory_search"
    }

    fn description(&self) -> &str {
        "Search stored memories by content or tag and return the best matches."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to look for in memory content and tags"
                },
                "k": {
                    "type": "integer",
                    "description": "Maximum number of memories to return (default 5)",
                    "default": DEFAULT_SEARCH_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'query' must be a string".into()))?;

        let k = arguments["k"]
            .as_u64()
            .unwrap_or(self.default_limit as u64)
            .min(MAX_RESULTS) as usize;

        let backend = self
            .backend
            .as_ref()
            .or(ctx.memory.as_ref())
            .ok_or_else(|| ToolError::ExecutionFailed {
                tool_name: "memory_search".into(),
                reason: "no memory store available for this run".into(),
            })?;

        let items = backend
            .search(query, k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "memory_search".into(),
                reason: e.to_string(),
            })?;

        let text = if items.is_empty() {
            format!("No memories found matching '{query}'.")
        } else {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. [{}] {}", i + 1, item.key, item.content))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let data = serde_json::to_value(&items).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "memory_search".into(),
            reason: e.to_string(),
        })?;

        Ok(ToolOutput {
            text: Some(text),
            data: Some(data),
        })
    }
}
