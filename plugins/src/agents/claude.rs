use async_trait::async_trait;
use cortex_core::api::{Agent, AgentError, AgentOutput, AgentTask};
use tokio_util::sync::CancellationToken;

use super::process::{probe, run_process, ProcessSpec};

/// Formatting instructions sent unless a custom system prompt is set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Output formatting rules:
1. Use clear numbered points or bullet points
2. No emojis or decorative characters
3. Be concise and direct
4. Structure: Brief summary first, then details if needed
5. Keep responses focused and actionable";

/// Runs tasks through the `claude` CLI in headless mode.
#[derive(Debug, Clone)]
pub struct ClaudeCodeAgent {
    executable: String,
    system_prompt: Option<String>,
    stream: bool,
}

impl ClaudeCodeAgent {
    pub fn new() -> Self {
        Self {
            executable: "claude".to_string(),
            system_prompt: None,
            stream: false,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build_args(&self, task: &AgentTask) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            "--output-format".to_string(),
            "text".to_string(),
            "--system-prompt".to_string(),
            self.system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        ];
        if let Some(dir) = &task.workdir {
            args.push("--cwd".to_string());
            args.push(dir.display().to_string());
        }
        if let Some(model) = task.model.as_deref().filter(|m| !m.trim().is_empty()) {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        if task.write {
            args.push("--dangerously-skip-permissions".to_string());
        }
        // Prompt must stay the last positional argument.
        args.push(task.prompt.clone());
        args
    }
}

impl Default for ClaudeCodeAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ClaudeCodeAgent {
    fn name(&self) -> &str {
        "claude-code"
    }

    async fn run(
        &self,
        task: &AgentTask,
        cancel: &CancellationToken,
    ) -> Result<AgentOutput, AgentError> {
        let spec = ProcessSpec::new(&self.executable, self.build_args(task))
            .workdir(task.workdir.clone())
            .stream(self.stream.then(|| task.name.clone()));
        run_process(&spec, cancel).await
    }

    async fn check(&self) -> Result<(), AgentError> {
        probe(&self.executable, &["--version"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::api::Tool;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn task() -> AgentTask {
        AgentTask {
            name: "review".into(),
            agent: "reviewer".into(),
            tool: Tool::ClaudeCode,
            model: None,
            prompt: "Review the code".into(),
            write: false,
            workdir: None,
        }
    }

    #[test]
    fn minimal_args_end_with_prompt() {
        let args = ClaudeCodeAgent::new().build_args(&task());
        assert_eq!(
            args,
            vec![
                "-p",
                "--output-format",
                "text",
                "--system-prompt",
                DEFAULT_SYSTEM_PROMPT,
                "Review the code",
            ]
        );
    }

    #[test]
    fn model_workdir_and_write_flags() {
        let mut t = task();
        t.model = Some("sonnet".into());
        t.write = true;
        t.workdir = Some(PathBuf::from("/tmp/project"));

        let args = ClaudeCodeAgent::new()
            .with_system_prompt("be brief")
            .build_args(&t);
        assert_eq!(args[4], "be brief");
        assert_eq!(&args[5..7], &["--cwd", "/tmp/project"]);
        assert_eq!(&args[7..9], &["--model", "sonnet"]);
        assert_eq!(args[9], "--dangerously-skip-permissions");
        assert_eq!(args.last().map(String::as_str), Some("Review the code"));
    }

    #[test]
    fn blank_system_prompt_keeps_default() {
        let args = ClaudeCodeAgent::new().with_system_prompt("  ").build_args(&task());
        assert_eq!(args[4], DEFAULT_SYSTEM_PROMPT);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_configured_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-claude");
        std::fs::write(&script, "#!/bin/sh\nfor last; do :; done\necho \"got: $last\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let agent = ClaudeCodeAgent::new().with_executable(script.display().to_string());
        let out = agent.run(&task(), &CancellationToken::new()).await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "got: Review the code\n");
    }
}
