//! `baton run` — Run one agent against a scripted model reply.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use baton_agent::{AgentInput, AgentResult, Orchestrator, OrchestratorConfig};
use baton_config::AppConfig;
use baton_memory::InMemoryStore;
use baton_providers::MockLlm;
use baton_tools::BuiltinOptions;
use clap::Args;

use super::load_config;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The goal for this run
    pub goal: String,

    /// Context strings handed to the planner (repeatable)
    #[arg(short, long)]
    pub context: Vec<String>,

    /// What the mock model replies; may end with `Steps: [...]`
    #[arg(short, long)]
    pub reply: Option<String>,

    /// Stream the reply word by word instead of running tool steps
    #[arg(long)]
    pub stream: bool,

    /// Token ceiling for the run
    #[arg(long)]
    pub max_tokens: Option<u64>,

    /// Cost ceiling for the run, in USD
    #[arg(long, value_name = "USD")]
    pub max_cost: Option<f64>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = Orchestrator::new().with_config(OrchestratorConfig::from(&config));
    let input = build_input(&args, &config);

    let result = if args.stream {
        let mut stdout = std::io::stdout();
        let result = orchestrator
            .stream(input, |chunk| {
                let _ = write!(stdout, "{chunk}");
                let _ = stdout.flush();
            })
            .await?;
        println!();
        result
    } else {
        orchestrator.run(input).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, args.stream);
    }
    Ok(())
}

/// Assemble the run input from flags and configuration. Flags win over the
/// configured budget.
fn build_input(args: &RunArgs, config: &AppConfig) -> AgentInput {
    let reply = args.reply.clone().unwrap_or_else(|| baton_providers::mock::FALLBACK_REPLY.to_string());
    let mut llm = MockLlm::new().with_responses([reply.clone()]);
    if args.stream {
        llm = llm.with_stream_chunks(word_chunks(&reply));
    }

    let mut budget = config.budget.clone();
    if args.max_tokens.is_some() {
        budget.max_tokens = args.max_tokens;
    }
    if args.max_cost.is_some() {
        budget.max_cost_usd = args.max_cost;
    }

    let tools = baton_tools::builtin_tools(BuiltinOptions {
        shell_enabled: config.tools.shell_enabled,
        shell_allowlist: config.tools.shell_allowlist.clone(),
        search_limit: config.memory.search_limit,
    });

    let mut input = AgentInput::new(args.goal.clone(), Arc::new(llm))
        .with_context(args.context.clone())
        .with_tools(tools)
        .with_memory(Arc::new(InMemoryStore::new()));
    if let Some(budget) = budget.to_budget() {
        input = input.with_budget(budget);
    }
    input
}

/// Split text into words, each keeping its trailing whitespace.
fn word_chunks(text: &str) -> Vec<String> {
    text.split_inclusive(char::is_whitespace)
        .map(str::to_string)
        .collect()
}

fn print_summary(result: &AgentResult, streamed: bool) {
    // A streamed answer is already on screen unless the budget replaced it.
    if !streamed || result.final_answer == baton_agent::BUDGET_STOP_ANSWER {
        println!("{}", result.final_answer);
    }
    println!();
    println!("Steps:");
    for (i, step) in result.steps.iter().enumerate() {
        match &step.tool_used {
            Some(tool) => println!("  {}. {} [{}] {}", i + 1, step.name, tool.name, step.summary),
            None => println!("  {}. {} {}", i + 1, step.name, step.summary),
        }
        if let Some(output) = &step.output {
            for line in output.lines() {
                println!("       {line}");
            }
        }
    }
    println!();
    println!(
        "Usage: {} prompt + {} completion tokens, ${:.6}",
        result.cost.prompt_tokens, result.cost.completion_tokens, result.cost.usd
    );
    println!("Events: {}", result.telemetry.len());
}
