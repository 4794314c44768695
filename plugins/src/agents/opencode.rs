use async_trait::async_trait;
use cortex_core::api::{Agent, AgentError, AgentOutput, AgentTask};
use tokio_util::sync::CancellationToken;

use super::process::{probe, run_process, ProcessSpec};

/// Runs tasks through the `opencode` CLI.
#[derive(Debug, Clone)]
pub struct OpenCodeAgent {
    executable: String,
    stream: bool,
}

impl OpenCodeAgent {
    pub fn new() -> Self {
        Self {
            executable: "opencode".to_string(),
            stream: false,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build_args(&self, task: &AgentTask) -> Vec<String> {
        let mut args = vec!["-p".to_string(), task.prompt.clone()];
        if let Some(model) = task.model.as_deref().filter(|m| !m.trim().is_empty()) {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        if task.write {
            args.push("--auto-approve".to_string());
        }
        args
    }
}

impl Default for OpenCodeAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for OpenCodeAgent {
    fn name(&self) -> &str {
        "opencode"
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
