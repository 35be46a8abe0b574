//! Shell tool — execute system commands.
//!
//! Supports command allowlisting. The child process is killed if the call
//! is cancelled, so a sandbox timeout never leaves it running.

use async_trait::async_trait;
use baton_core::error::ToolError;
use baton_core::tool::{Tool, ToolContext, ToolOutput};
use tokio::process::Command;
use tracing::{debug, warn};

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
}

impl ShellTool {
    pub fn new(allowed_commands: Vec<String>) -> Self {
        Self { allowed_commands }
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }

        let base_cmd = command.split_whitespace().next().unwrap_or("").trim();
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str { "shell" }

    fn description(&self) -> &str {
        "Execute a shell command and return its stdout. Fails on a non-zero exit status."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'command' must be a string".into()))?;

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: "shell".into(),
                reason: format!("Command '{}' not in allowlist", command.split_whitespace().next().unwrap_or("")),
            });
        }

        debug!(run_id = %ctx.run_id, command = %command, "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        let output = cmd
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "shell".into(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Command failed");
            return Err(ToolError::ExecutionFailed {
                tool_name: "shell".into(),
                reason: format!("exit code {code}: {}", stderr.trim()),
            });
        }

        let text = if stderr.is_empty() {
            stdout
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        };

        Ok(ToolOutput::text(text.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToolContext {
        ToolContext::new("test-run")
    }

    #[test]
    fn allowlist_check() {
        let tool = ShellTool::new(vec!["ls".into(), "cat".into(), "git".into()]);
        assert!(tool.is_command_allowed("ls -la"));
        assert!(tool.is_command_allowed("cat file.txt"));
        assert!(tool.is_command_allowed("git status"));
        assert!(!tool.is_command_allowed("rm -rf /"));
        assert!(!tool.is_command_allowed("sudo something"));
    }

    #[test]
    fn empty_allowlist_allows_all() {
        let tool = ShellTool::new(vec![]);
        assert!(tool.is_command_allowed("anything goes"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn execute_echo() {
        let tool = ShellTool::new(vec![]);
        let result = tool
            .execute(serde_json::json!({"command": "echo hello"}), &ctx())
            .await
            .unwrap();
        assert_eq!(result.text.as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let tool = ShellTool::new(vec![]);
        let err = tool
            .execute(serde_json::json!({"command": "exit 3"}), &ctx())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }

    #[tokio::test]
    async fn blocked_command() {
        let tool = ShellTool::new(vec!["ls".into()]);
        let result = tool
            .execute(serde_json::json!({"command": "rm -rf /"}), &ctx())
            .await;
        assert!(matches!(result, Err(ToolError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn non_string_command_rejected() {
        let tool = ShellTool::new(vec![]);
        let result = tool.execute(serde_json::json!({"command": 5}), &ctx()).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
