//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world. Each one
//! has a unique name, a minimal argument schema (at least a `required` key
//! list), and an asynchronous `execute`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use crate::error::ToolError;
use crate::memory::MemoryStore;

/// Commands the built-in shell tool may run unless configured otherwise.
pub const SAFE_COMMANDS: &[&str] = &[
    "ls", "dir", "cat", "head", "tail", "echo", "pwd", "date", "whoami", "wc", "grep", "find",
    "which", "git",
];

/// One step of a structured plan proposed by the model.
///
/// Extracted best-effort from free text; every field besides `name` may be
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Step label
    #[serde(default)]
    pub name: String,

    /// Name of the tool to execute, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Arguments as a JSON value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Human-readable output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            data: None,
        }
    }

    pub fn data(data: serde_json::Value) -> Self {
        Self {
            text: None,
            data: Some(data),
        }
    }

    /// Textual form recorded in the step trace: the text if present,
    /// otherwise the JSON encoding of `data` (or of an empty string).
    pub fn render(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        let data = self
            .data
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(String::new()));
        serde_json::to_string(&data).unwrap_or_default()
    }
}

/// Per-run context handed to every tool invocation.
#[derive(Clone, Default)]
pub struct ToolContext {
    /// The run this call belongs to
    pub run_id: String,

    /// The run's memory store, if the caller supplied one
    pub memory: Option<Arc<dyn MemoryStore>>,
}

impl ToolContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            memory: None,
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("run_id", &self.run_id)
            .field("memory", &self.memory.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

/// The core Tool trait.
///
/// Implementations must return `Err` on failure rather than partial data.
/// Tools shared across concurrent runs must tolerate concurrent calls.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "shell").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> std::result::Result<ToolOutput, ToolError>;
}

/// An immutable-after-construction name → tool mapping.
///
/// The orchestrator builds one per run from the caller's tool list and only
/// ever reads from it afterwards.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Build a registry from a list. Later tools replace earlier ones with
    /// the same name.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
