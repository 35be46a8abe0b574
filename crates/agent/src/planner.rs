//! The built-in planner.

use async_trait::async_trait;
use baton_core::agent::{AgentStep, Planner};
use baton_core::error::PlanError;

/// Plans a single `plan` step that notes the first two context strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlanner;

#[async_trait]
impl Planner for DefaultPlanner {
    async fn plan_steps(&self, _goal: &str, context: &[String]) -> Result<Vec<AgentStep>, PlanError> {
        let summary = if context.is_empty() {
            "Plan execution".to_string()
        } else {
            let head: Vec<&str> = context.iter().take(2).map(String::as_str).collect();
            format!("Use context: {}", head.join("; "))
        };
        Ok(vec![AgentStep::new("plan", summary)])
    }
}
