//! Tool execution plumbing and built-in tools for Baton.
//!
//! - [`validate`]: the minimal required-keys argument check
//! - [`sandbox`]: timeout-bounded, output-capped execution of one call
//! - [`shell`] and [`memory_search`]: ready-made tools for the CLI and tests

pub mod memory_search;
pub mod sandbox;
pub mod shell;
pub mod validate;

use baton_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;

pub use memory_search::MemorySearchTool;
pub use sandbox::{
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, Sandbox, SandboxOptions, TRUNCATION_MARKER,
    cap_output, execute_with_timeout,
};
pub use shell::ShellTool;
pub use validate::validate_args;

pub use baton_core::tool::SAFE_COMMANDS;

/// Settings for the built-in tool set.
#[derive(Debug, Clone)]
pub struct BuiltinOptions {
    pub shell_enabled: bool,
    pub shell_allowlist: Vec<String>,
    pub search_limit: usize,
}

impl Default for BuiltinOptions {
    fn default() -> Self {
        Self {
            shell_enabled: true,
            shell_allowlist: SAFE_COMMANDS.iter().map(|c| c.to_string()).collect(),
            search_limit: baton_core::memory::DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// The built-in tools, optionally without the shell.
pub fn builtin_tools(options: BuiltinOptions) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
    if options.shell_enabled {
        tools.push(Arc::new(ShellTool::new(options.shell_allowlist)));
    }
    tools.push(Arc::new(
        MemorySearchTool::new().with_default_limit(options.search_limit),
    ));
    tools
}

/// Create a registry with all built-in tools and the safe shell allowlist.
pub fn default_registry() -> ToolRegistry {
    ToolRegistry::from_tools(builtin_tools(BuiltinOptions::default()))
}
