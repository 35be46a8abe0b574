//! The orchestrator run loop.

use std::sync::Arc;
use std::time::Duration;
use baton_config::AppConfig;
use baton_core::agent::{AgentStep, Planner};
use baton_core::memory::MemoryStore;
use baton_core::message::Message;
use baton_core::provider::LlmClient;
use baton_core::tool::{Tool, ToolCall, ToolContext, ToolRegistry};
use baton_core::usage::{Budget, Usage, budget_exceeded};
use baton_telemetry::{TelemetryEvent, TelemetryLog, kinds};
use baton_tools::{Sandbox, SandboxOptions, validate_args};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::parser::try_parse_steps;
use crate::planner::DefaultPlanner;

/// Final answer of a run that went over budget.
pub const BUDGET_STOP_ANSWER: &str = "Stopped due to budget limit.";

/// Everything one run needs.
#[derive(Clone)]
pub struct AgentInput {
    pub goal: String,
    pub context: Vec<String>,
    pub budget: Option<Budget>,
    pub tools: Vec<Arc<dyn Tool>>,
    pub memory: Option<Arc<dyn MemoryStore>>,
    pub llm: Arc<dyn LlmClient>,
}

impl AgentInput {
    pub fn new(goal: impl Into<String>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            goal: goal.into(),
            context: Vec::new(),
            budget: None,
            tools: Vec::new(),
            memory: None,
            llm,
        }
    }

    pub fn with_context(mut self, context: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.context = context.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }
}

impl std::fmt::Debug for AgentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tools: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("AgentInput")
            .field("goal", &self.goal)
            .field("context", &self.context)
            .field("budget", &self.budget)
            .field("tools", &tools)
            .field("memory", &self.memory.as_ref().map(|m| m.name().to_string()))
            .field("llm", &self.llm.name())
            .finish()
    }
}

/// What a finished run hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub final_answer: String,
    pub steps: Vec<AgentStep>,
    pub cost: Usage,
    pub telemetry: Vec<TelemetryEvent>,
}

/// Fixed settings shared by every run of an [`Orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// First message of the conversation sent to the model
    pub system_prompt: String,

    /// Per-tool timeout and output cap
    pub sandbox: SandboxOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are an orchestrator.".into(),
            sandbox: SandboxOptions::default(),
        }
    }
}

impl From<&AppConfig> for OrchestratorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            system_prompt: config.agent.system_prompt.clone(),
            sandbox: SandboxOptions {
                timeout: Duration::from_millis(config.agent.tool_timeout_ms),
                max_output_bytes: config.agent.max_output_bytes,
            },
        }
    }
}

/// Drives runs: plan, one model call, sequential tool steps, budget check.
///
/// The orchestrator itself holds no per-run state, so one instance can serve
/// concurrent runs as long as the collaborators in each [`AgentInput`] allow
/// it.
pub struct Orchestrator {
    planner: Arc<dyn Planner>,
    config: OrchestratorConfig,
    sandbox: Sandbox,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// An orchestrator with the [`DefaultPlanner`] and default limits.
    pub fn new() -> Self {
        let config = OrchestratorConfig::default();
        Self {
            planner: Arc::new(DefaultPlanner),
            sandbox: Sandbox::new(config.sandbox),
            config,
        }
    }

    /// Replace the planner.
    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.sandbox = Sandbox::new(config.sandbox);
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run to completion without streaming.
    ///
    /// Only planner and model failures are returned as errors. Tool steps
    /// that cannot run, or that fail, are recorded in `steps`. The budget is
    /// checked once every parsed step has run.
    pub async fn run(&self, input: AgentInput) -> baton_core::Result<AgentResult> {
        let mut run = RunState::start(&input.goal, false);
        self.plan(&mut run, &input).await?;

        let response = input.llm.chat(&self.conversation(&input.goal)).await?;
        run.merge_usage(response.usage);

        if let Some(calls) = try_parse_steps(&response.content) {
            debug!(run_id = %run.id, steps = calls.len(), "Model proposed a plan");
            let registry = ToolRegistry::from_tools(input.tools.iter().cloned());
            let mut ctx = ToolContext::new(run.id.clone());
            if let Some(memory) = &input.memory {
                ctx = ctx.with_memory(Arc::clone(memory));
            }
            for call in calls {
                self.execute_step(&mut run, &registry, &ctx, call).await;
            }
        }

        if run.over_budget(input.budget.as_ref()) {
            return Ok(run.stop_for_budget());
        }
        Ok(run.finish(response.content))
    }

    /// Run with the model reply streamed to `on_chunk`.
    ///
    /// Each content chunk is forwarded and recorded as an `llm.token` event
    /// before the next one is read. No tool steps run in this mode.
    pub async fn stream<F>(&self, input: AgentInput, mut on_chunk: F) -> baton_core::Result<AgentResult>
    where
        F: FnMut(&str) + Send,
    {
        let mut run = RunState::start(&input.goal, true);
        self.plan(&mut run, &input).await?;

        let mut rx = input.llm.chat_stream(&self.conversation(&input.goal)).await?;
        let mut content = String::new();
        let mut usage = Usage::default();
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk?;
            if let Some(text) = chunk.content.as_deref() {
                on_chunk(text);
                run.telemetry.record(kinds::LLM_TOKEN);
                content.push_str(text);
            }
            if let Some(delta) = &chunk.usage {
                usage += *delta;
            }
            if chunk.done {
                break;
            }
        }
        run.merge_usage(usage);

        if run.over_budget(input.budget.as_ref()) {
            return Ok(run.stop_for_budget());
        }
        Ok(run.finish(content))
    }

    async fn plan(&self, run: &mut RunState, input: &AgentInput) -> baton_core::Result<()> {
        let planned = self.planner.plan_steps(&input.goal, &input.context).await?;
        run.telemetry
            .record_with(kinds::AGENT_PLAN, json!({ "steps": planned.len() }));
        run.steps.extend(planned);
        Ok(())
    }

    fn conversation(&self, goal: &str) -> [Message; 2] {
        [
            Message::system(self.config.system_prompt.as_str()),
            Message::user(goal),
        ]
    }

    /// Process one parsed step. Never fails: every outcome becomes a step.
    async fn execute_step(
        &self,
        run: &mut RunState,
        registry: &ToolRegistry,
        ctx: &ToolContext,
        call: ToolCall,
    ) {
        let ToolCall { name, tool, args } = call;

        let Some(tool_name) = tool else {
            run.steps.push(AgentStep::new(name, "No tool specified"));
            return;
        };
        let Some(tool) = registry.get(&tool_name) else {
            debug!(run_id = %run.id, tool = %tool_name, "Plan references unknown tool");
            run.steps
                .push(AgentStep::new(name, format!("Tool not found: {tool_name}")));
            return;
        };
        if let Err(e) = validate_args(&tool.parameters_schema(), args.as_ref()) {
            run.steps.push(
                AgentStep::new(name, format!("Invalid args: {e}")).with_tool(tool.name()),
            );
            return;
        }

        run.telemetry
            .record_with(kinds::TOOL_START, json!({ "tool": tool.name() }));
        let args = args.unwrap_or_else(|| json!({}));

        match self.sandbox.run(tool, args, ctx).await {
            Ok(output) => {
                debug!(run_id = %run.id, tool = %tool.name(), bytes = output.len(), "Tool step executed");
                run.steps
                    .push(AgentStep::new(name, "Executed").with_tool(tool.name()).with_output(output));
                run.telemetry
                    .record_with(kinds::TOOL_END, json!({ "tool": tool.name() }));
            }
            Err(e) => {
                warn!(run_id = %run.id, tool = %tool.name(), error = %e, "Tool step failed");
                run.steps
                    .push(AgentStep::new(name, format!("Tool error: {e}")).with_tool(tool.name()));
                run.telemetry.record_with(
                    kinds::TOOL_ERROR,
                    json!({ "tool": tool.name(), "error": e.to_string() }),
                );
            }
        }
    }
}

/// Mutable state of a single run, dropped when the run returns.
struct RunState {
    id: String,
    telemetry: TelemetryLog,
    steps: Vec<AgentStep>,
    total: Usage,
}

impl RunState {
    fn start(goal: &str, stream: bool) -> Self {
        let id = Uuid::new_v4().to_string();
        info!(run_id = %id, goal, stream, "Agent run started");

        let mut telemetry = TelemetryLog::new();
        let meta = if stream {
            json!({ "goal": goal, "stream": true })
        } else {
            json!({ "goal": goal })
        };
        telemetry.record_with(kinds::AGENT_START, meta);

        Self {
            id,
            telemetry,
            steps: Vec::new(),
            total: Usage::default(),
        }
    }

    fn merge_usage(&mut self, delta: Usage) {
        self.total += delta;
        self.telemetry
            .record_with(kinds::LLM_CHAT, json!({ "tokens": delta }));
    }

    fn over_budget(&self, budget: Option<&Budget>) -> bool {
        let exceeded = budget_exceeded(&self.total, budget);
        if exceeded {
            warn!(
                run_id = %self.id,
                tokens = self.total.total_tokens(),
                usd = self.total.usd,
                "Budget exceeded"
            );
        }
        exceeded
    }

    fn stop_for_budget(self) -> AgentResult {
        self.finish(BUDGET_STOP_ANSWER.to_string())
    }

    fn finish(self, final_answer: String) -> AgentResult {
        info!(
            run_id = %self.id,
            steps = self.steps.len(),
            tokens = self.total.total_tokens(),
            events = self.telemetry.len(),
            "Agent run finished"
        );
        AgentResult {
            final_answer,
            steps: self.steps,
            cost: self.total,
            telemetry: self.telemetry.snapshot(),
        }
    }
}

/// Run once with the default orchestrator.
pub async fn run_agent(input: AgentInput) -> baton_core::Result<AgentResult> {
    Orchestrator::new().run(input).await
}

/// Stream once with the default orchestrator.
pub async fn stream_agent<F>(input: AgentInput, on_chunk: F) -> baton_core::Result<AgentResult>
where
    F: FnMut(&str) + Send,
{
    Orchestrator::new().stream(input, on_chunk).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use baton_core::error::{PlanError, ProviderError, ToolError};
    use baton_core::memory::MemoryItem;
    use baton_core::tool::ToolOutput;
    use baton_memory::InMemoryStore;
    use baton_providers::MockLlm;
    use baton_tools::{MemorySearchTool, TRUNCATION_MARKER};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes the text argument" }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({ "type": "object", "required": ["text"] })
        }
        async fn execute(&self, args: serde_json::Value, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(args["text"].as_str().unwrap_or_default()))
        }
    }

    struct DataTool;

    #[async_trait]
    impl Tool for DataTool {
        fn name(&self) -> &str { "data" }
        fn description(&self) -> &str { "Returns structured data only" }
        fn parameters_schema(&self) -> serde_json::Value { json!({}) }
        async fn execute(&self, _args: serde_json::Value, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::data(json!({ "count": 3 })))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str { "broken" }
        fn description(&self) -> &str { "Always fails" }
        fn parameters_schema(&self) -> serde_json::Value { json!({}) }
        async fn execute(&self, _args: serde_json::Value, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    struct SleepyTool;

    #[async_trait]
    impl Tool for SleepyTool {
        fn name(&self) -> &str { "sleepy" }
        fn description(&self) -> &str { "Sleeps for a minute" }
        fn parameters_schema(&self) -> serde_json::Value { json!({}) }
        async fn execute(&self, _args: serde_json::Value, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolOutput::text("woke up"))
        }
    }

    struct FailingPlanner;

    #[async_trait]
    impl Planner for FailingPlanner {
        async fn plan_steps(&self, _goal: &str, _context: &[String]) -> Result<Vec<AgentStep>, PlanError> {
            Err(PlanError::Failed("no idea".into()))
        }
    }

    fn mock(reply: &str) -> Arc<MockLlm> {
        Arc::new(MockLlm::new().with_responses([reply]))
    }

    fn summaries(result: &AgentResult) -> Vec<&str> {
        result.steps.iter().map(|s| s.summary.as_str()).collect()
    }

    fn event_kinds(result: &AgentResult) -> Vec<&str> {
        result.telemetry.iter().map(|e| e.kind.as_str()).collect()
    }

    #[tokio::test]
    async fn plain_reply_becomes_final_answer() {
        let result = run_agent(AgentInput::new("Test", mock("Final answer.")))
            .await
            .unwrap();

        assert!(result.final_answer.contains("Final"));
        assert!(!result.steps.is_empty());
        assert_eq!(result.steps[0].name, "plan");
        assert_eq!(
            event_kinds(&result),
            vec!["agent.start", "agent.plan", "llm.chat"]
        );
        assert_eq!(result.telemetry[0].meta_str("goal"), Some("Test"));
        assert_eq!(result.telemetry[1].meta_value("steps"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn usage_is_reported_as_cost() {
        let llm = Arc::new(MockLlm::new().with_responses(["Final answer."]).with_token_cost(0.001, 0.002));
        let result = run_agent(AgentInput::new("Test", llm)).await.unwrap();

        // 6 + 1 prompt tokens, "Final answer." is 13 chars -> 4 completion tokens
        assert_eq!(result.cost.prompt_tokens, 7);
        assert_eq!(result.cost.completion_tokens, 4);
        assert!((result.cost.usd - 0.015).abs() < 1e-9);

        let chat = &result.telemetry[2];
        assert_eq!(chat.meta_value("tokens").unwrap()["prompt_tokens"], json!(7));
    }

    #[tokio::test]
    async fn tool_steps_run_in_order_with_matching_telemetry() {
        let reply = r#"Working on it. Steps: [
            {"name": "first", "tool": "echo", "args": {"text": "one"}},
            {"name": "note"},
            {"name": "second", "tool": "data"},
            {"name": "third", "tool": "echo", "args": {"text": "two"}}
        ]"#;
        let input = AgentInput::new("Test", mock(reply))
            .with_tool(Arc::new(EchoTool))
            .with_tool(Arc::new(DataTool));
        let result = run_agent(input).await.unwrap();

        let names: Vec<&str> = result.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["plan", "first", "note", "second", "third"]);
        assert_eq!(
            summaries(&result),
            vec!["Plan execution", "Executed", "No tool specified", "Executed", "Executed"]
        );
        assert_eq!(result.steps[1].output.as_deref(), Some("one"));
        assert_eq!(result.steps[3].output.as_deref(), Some(r#"{"count":3}"#));
        assert_eq!(result.steps[3].tool_used.as_ref().unwrap().name, "data");
        assert!(result.steps[2].tool_used.is_none());

        assert_eq!(
            event_kinds(&result),
            vec![
                "agent.start", "agent.plan", "llm.chat",
                "tool.start", "tool.end",
                "tool.start", "tool.end",
                "tool.start", "tool.end",
            ]
        );
        assert!(result.telemetry.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
        assert_eq!(result.final_answer, reply);
    }

    #[tokio::test]
    async fn unknown_tool_is_recorded_and_run_continues() {
        let reply = r#"Steps: [{"name":"look","tool":"nope","args":{}},{"name":"say","tool":"echo","args":{"text":"hi"}}]"#;
        let input = AgentInput::new("Test", mock(reply)).with_tool(Arc::new(EchoTool));
        let result = run_agent(input).await.unwrap();

        assert_eq!(result.steps[1].summary, "Tool not found: nope");
        assert!(result.steps[1].tool_used.is_none());
        assert_eq!(result.steps[2].summary, "Executed");
    }

    #[tokio::test]
    async fn loosely_shaped_plan_still_runs_valid_steps() {
        let reply = r#"Steps: [{"name":"odd","tool":7},1,{"name":null,"tool":"echo","args":{"text":"ok"}}]"#;
        let input = AgentInput::new("Test", mock(reply)).with_tool(Arc::new(EchoTool));
        let result = run_agent(input).await.unwrap();

        assert_eq!(
            summaries(&result),
            vec!["Plan execution", "Tool not found: 7", "No tool specified", "Executed"]
        );
        assert_eq!(result.steps[3].output.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn missing_argument_is_recorded_without_running() {
        let reply = r#"Steps: [{"name":"say","tool":"echo","args":{}}]"#;
        let input = AgentInput::new("Test", mock(reply)).with_tool(Arc::new(EchoTool));
        let result = run_agent(input).await.unwrap();

        let step = &result.steps[1];
        assert_eq!(step.summary, "Invalid args: Missing required arg: text");
        assert_eq!(step.tool_used.as_ref().unwrap().name, "echo");
        assert!(step.output.is_none());
        assert!(!event_kinds(&result).contains(&"tool.start"));
    }

    #[tokio::test]
    async fn tool_failure_is_recorded_and_run_continues() {
        let reply = r#"Steps: [{"name":"a","tool":"broken"},{"name":"b","tool":"echo","args":{"text":"after"}}]"#;
        let input = AgentInput::new("Test", mock(reply))
            .with_tools(vec![Arc::new(BrokenTool), Arc::new(EchoTool)]);
        let result = run_agent(input).await.unwrap();

        assert_eq!(
            result.steps[1].summary,
            "Tool error: Tool execution failed: broken: disk on fire"
        );
        assert_eq!(result.steps[2].output.as_deref(), Some("after"));

        let error = result.telemetry.iter().find(|e| e.kind == "tool.error").unwrap();
        assert_eq!(error.meta_str("tool"), Some("broken"));
        assert!(error.meta_str("error").unwrap().contains("disk on fire"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out_and_run_continues() {
        let reply = r#"Steps: [{"name":"wait","tool":"sleepy"},{"name":"say","tool":"echo","args":{"text":"still here"}}]"#;
        let orchestrator = Orchestrator::new().with_config(OrchestratorConfig {
            sandbox: SandboxOptions {
                timeout: Duration::from_millis(50),
                ..SandboxOptions::default()
            },
            ..OrchestratorConfig::default()
        });
        let input = AgentInput::new("Test", mock(reply))
            .with_tools(vec![Arc::new(SleepyTool), Arc::new(EchoTool)]);

        let started = tokio::time::Instant::now();
        let result = orchestrator.run(input).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(
            result.steps[1].summary,
            "Tool error: Tool execution timed out: sleepy after 50ms"
        );
        assert_eq!(result.steps[2].summary, "Executed");
    }

    #[tokio::test]
    async fn long_output_is_capped() {
        let text = "x".repeat(64);
        let reply = format!(r#"Steps: [{{"name":"big","tool":"echo","args":{{"text":"{text}"}}}}]"#);
        let orchestrator = Orchestrator::new().with_config(OrchestratorConfig {
            sandbox: SandboxOptions {
                max_output_bytes: 16,
                ..SandboxOptions::default()
            },
            ..OrchestratorConfig::default()
        });
        let input = AgentInput::new("Test", mock(&reply)).with_tool(Arc::new(EchoTool));
        let result = orchestrator.run(input).await.unwrap();

        let expected = format!("{}{}", "x".repeat(16), TRUNCATION_MARKER);
        assert_eq!(result.steps[1].output.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn budget_trip_keeps_executed_steps_then_stops() {
        let reply = r#"Steps: [{"name":"say","tool":"echo","args":{"text":"hi"}}]"#;
        let input = AgentInput::new("Test", mock(reply))
            .with_tool(Arc::new(EchoTool))
            .with_budget(Budget::tokens(1));
        let result = run_agent(input).await.unwrap();

        assert_eq!(result.final_answer, BUDGET_STOP_ANSWER);
        assert_eq!(summaries(&result), vec!["Plan execution", "Executed"]);
        assert_eq!(result.steps[1].output.as_deref(), Some("hi"));
        assert!(result.cost.total_tokens() > 1);
        assert_eq!(
            event_kinds(&result),
            vec!["agent.start", "agent.plan", "llm.chat", "tool.start", "tool.end"]
        );
    }

    #[tokio::test]
    async fn cost_budget_trips_independently() {
        let llm = Arc::new(MockLlm::new().with_token_cost(1.0, 1.0));
        let input = AgentInput::new("Test", llm).with_budget(Budget {
            max_tokens: Some(1_000_000),
            max_cost_usd: Some(0.5),
        });
        let result = run_agent(input).await.unwrap();
        assert_eq!(result.final_answer, BUDGET_STOP_ANSWER);
    }

    #[tokio::test]
    async fn generous_budget_keeps_answer() {
        let input = AgentInput::new("Test", mock("Final answer.")).with_budget(Budget::tokens(1_000));
        let result = run_agent(input).await.unwrap();
        assert_eq!(result.final_answer, "Final answer.");
    }

    #[tokio::test]
    async fn planner_failure_aborts_run() {
        let llm = Arc::new(MockLlm::new());
        let orchestrator = Orchestrator::new().with_planner(Arc::new(FailingPlanner));
        let err = orchestrator
            .run(AgentInput::new("Test", llm.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, baton_core::Error::Planner(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn model_failure_aborts_run() {
        let llm = Arc::new(MockLlm::failing(ProviderError::Request("connection refused".into())));
        let err = run_agent(AgentInput::new("Test", llm)).await.unwrap_err();
        assert!(matches!(err, baton_core::Error::Provider(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn context_reaches_the_planner() {
        let input = AgentInput::new("Test", mock("done")).with_context(["notes.md", "todo.md"]);
        let result = run_agent(input).await.unwrap();
        assert_eq!(result.steps[0].summary, "Use context: notes.md; todo.md");
    }

    #[tokio::test]
    async fn memory_is_handed_to_tools() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put(MemoryItem::new("color", "The user's favorite color is blue"))
            .await
            .unwrap();

        let reply = r#"Steps: [{"name":"recall","tool":"memory_search","args":{"query":"color"}}]"#;
        let input = AgentInput::new("Test", mock(reply))
            .with_tool(Arc::new(MemorySearchTool::new()))
            .with_memory(store);
        let result = run_agent(input).await.unwrap();

        assert_eq!(result.steps[1].summary, "Executed");
        assert!(result.steps[1].output.as_deref().unwrap().contains("favorite color is blue"));
    }

    #[tokio::test]
    async fn stream_forwards_chunks_in_order() {
        let llm = Arc::new(MockLlm::new().with_stream_chunks(["A", "B", "C"]));
        let mut seen = String::new();
        let result = stream_agent(AgentInput::new("Test", llm), |chunk| seen.push_str(chunk))
            .await
            .unwrap();

        assert_eq!(seen, "ABC");
        assert_eq!(result.final_answer, "ABC");
        assert_eq!(
            event_kinds(&result),
            vec!["agent.start", "agent.plan", "llm.token", "llm.token", "llm.token", "llm.chat"]
        );
        assert_eq!(result.telemetry[0].meta_value("stream"), Some(&json!(true)));
        assert!(result.cost.completion_tokens > 0);
    }

    #[tokio::test]
    async fn stream_never_runs_tools() {
        let llm = Arc::new(
            MockLlm::new().with_stream_chunks([r#"Steps: [{"name":"say","tool":"echo","args":{"text":"hi"}}]"#]),
        );
        let input = AgentInput::new("Test", llm).with_tool(Arc::new(EchoTool));
        let result = stream_agent(input, |_| {}).await.unwrap();

        assert_eq!(result.steps.len(), 1);
        assert!(!event_kinds(&result).contains(&"tool.start"));
    }

    #[tokio::test]
    async fn stream_respects_budget() {
        let llm = Arc::new(MockLlm::new().with_stream_chunks(["A", "B"]));
        let input = AgentInput::new("Test", llm).with_budget(Budget::tokens(1));
        let result = stream_agent(input, |_| {}).await.unwrap();
        assert_eq!(result.final_answer, BUDGET_STOP_ANSWER);
    }

    #[tokio::test]
    async fn stream_without_chunks_falls_back_to_single_chunk() {
        let mut chunks = Vec::new();
        let result = stream_agent(AgentInput::new("Test", mock("whole reply")), |c| {
            chunks.push(c.to_string())
        })
        .await
        .unwrap();

        assert_eq!(chunks, vec!["whole reply"]);
        assert_eq!(result.final_answer, "whole reply");
    }

    #[test]
    fn config_follows_app_config() {
        let mut app = AppConfig::default();
        app.agent.tool_timeout_ms = 250;
        app.agent.system_prompt = "Be brief.".into();

        let config = OrchestratorConfig::from(&app);
        assert_eq!(config.sandbox.timeout, Duration::from_millis(250));
        assert_eq!(config.sandbox.max_output_bytes, 262_144);
        assert_eq!(config.system_prompt, "Be brief.");
    }

    #[test]
    fn result_serializes_event_type() {
        let mut log = TelemetryLog::new();
        log.record(kinds::LLM_TOKEN);
        let result = AgentResult {
            final_answer: "ok".into(),
            steps: vec![],
            cost: Usage::default(),
            telemetry: log.snapshot(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""type":"llm.token""#));
        assert!(json.contains(r#""final_answer":"ok""#));
    }
}
