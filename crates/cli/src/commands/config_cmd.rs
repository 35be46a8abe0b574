//! `baton config` — Configuration management commands.

use super::load_config;
use baton_config::AppConfig;
use std::path::Path;

pub fn show(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(path: Option<&Path>) {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    println!("{}", config_path.display());
}

pub fn validate(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match load_config(path) {
        Ok(config) => {
            println!("   Config parsed successfully");

            let mut warnings = Vec::new();
            if config.tools.shell_enabled && config.tools.shell_allowlist.is_empty() {
                warnings.push("Shell tool enabled with an empty allowlist; every command will be refused");
            }
            if config.agent.system_prompt.trim().is_empty() {
                warnings.push("Empty system prompt");
            }

            if warnings.is_empty() {
                println!("   All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   warning: {w}");
                }
            }

            println!();
            println!("   Tool timeout:  {} ms", config.agent.tool_timeout_ms);
            println!("   Output cap:    {} bytes", config.agent.max_output_bytes);
            println!(
                "   Max tokens:    {}",
                config.budget.max_tokens.map_or("unbounded".to_string(), |t| t.to_string())
            );
            println!(
                "   Max cost:      {}",
                config.budget.max_cost_usd.map_or("unbounded".to_string(), |c| format!("${c}"))
            );
            println!("   Shell tool:    {}", if config.tools.shell_enabled { "on" } else { "off" });
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
