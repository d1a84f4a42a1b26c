//! LLM Subprocess: calls the `claude` CLI as a completion backend.
//!
//! Single attempt per call; the pipeline owns failure handling.

use super::completion::CompletionClient;
use crate::{AiError, AiResult};
use std::process::Command;

pub struct ClaudeCliClient {
    model: String,
    id: String,
}

impl ClaudeCliClient {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            id: format!("claude-cli:{}", model),
        }
    }
}

impl CompletionClient for ClaudeCliClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn complete(&self, prompt: &str) -> AiResult<String> {
        tracing::info!(model = %self.model, prompt_len = prompt.len(), "LLM subprocess call starting");
        execute_claude(prompt, &self.model).inspect_err(|e| {
            tracing::warn!(model = %self.model, error = %e, "LLM subprocess call failed");
        })
    }
}

fn execute_claude(prompt: &str, model: &str) -> AiResult<String> {
    let child = Command::new("claude")
        .args(["--model", model, "-p", prompt])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| {
            AiError::ExternalService(format!(
                "Failed to spawn claude subprocess: {}. Is `claude` CLI installed?",
                e
            ))
        })?;

    let output = child
        .wait_with_output()
        .map_err(|e| AiError::ExternalService(format!("Claude subprocess wait failed: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AiError::ExternalService(format!(
            "Claude subprocess failed (exit {}): {}",
            output.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if stdout.trim().is_empty() {
        return Err(AiError::ExternalService("Claude returned empty response".into()));
    }

    Ok(stdout)
}

/// Check if claude CLI is available on PATH.
pub fn is_claude_available() -> bool {
    Command::new("claude")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
