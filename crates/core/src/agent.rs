//! Step records and the planner collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::PlanError;

/// The tool a step ran (or tried to run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsed {
    pub name: String,
}

/// One planning or tool-execution record in a run's output trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_used: Option<ToolUsed>,

    pub summary: String,

    /// Capped tool output, present only for executed steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl AgentStep {
    /// A step that involved no tool.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tool_used: None,
            summary: summary.into(),
            output: None,
        }
    }

    /// Attribute this step to a tool.
    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_used = Some(ToolUsed {
            name: tool_name.into(),
        });
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Produces the initial ordered step list for a goal.
///
/// Implementations must return at least one step. A failure here is fatal
/// to the run.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan_steps(
        &self,
        goal: &str,
        context: &[String],
    ) -> std::result::Result<Vec<AgentStep>, PlanError>;
}
