//! The orchestrator core of Baton.
//!
//! One run follows a fixed sequence:
//!
//! 1. **Plan**: ask the [`Planner`](baton_core::agent::Planner) for the initial steps
//! 2. **Ask**: send the goal to the language model once (optionally streamed)
//! 3. **Act**: if the reply carries a `Steps:` plan, run each tool step in
//!    order through the sandbox
//! 4. **Check**: stop with a fixed answer if the budget tripped, otherwise
//!    return the model's reply
//!
//! Planner and model failures abort the run. Every per-step failure is
//! recorded in the step list instead.

pub mod loop_runner;
pub mod parser;
pub mod planner;

pub use loop_runner::{
    AgentInput, AgentResult, BUDGET_STOP_ANSWER, Orchestrator, OrchestratorConfig, run_agent,
    stream_agent,
};
pub use parser::{STEPS_MARKER, try_parse_steps};
pub use planner::DefaultPlanner;
