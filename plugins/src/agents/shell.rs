use async_trait::async_trait;
use cortex_core::api::{Agent, AgentError, AgentOutput, AgentTask};
use tokio_util::sync::CancellationToken;

use super::process::{probe, run_process, ProcessSpec};

/// Runs the task prompt as a shell command line.
#[derive(Debug, Clone)]
pub struct ShellAgent {
    shell: String,
    stream: bool,
}

impl ShellAgent {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            stream: false,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

impl Default for ShellAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ShellAgent {
    fn name(&self) -> &str {
        "shell"
    }

    async fn run(
        &self,
        task: &AgentTask,
        cancel: &CancellationToken,
    ) -> Result<AgentOutput, AgentError> {
        if task.prompt.trim().is_empty() {
            return Err(AgentError::InvalidTask(format!(
                "no command specified for shell task '{}'",
                task.name
            )));
        }
        let spec = ProcessSpec::new(&self.shell, vec!["-c".to_string(), task.prompt.clone()])
            .workdir(task.workdir.clone())
            .stream(self.stream.then(|| task.name.clone()));
        run_process(&spec, cancel).await
    }

    async fn check(&self) -> Result<(), AgentError> {
        probe(&self.shell, &["-c", "echo ok"]).await
    }
}
