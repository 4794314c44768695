use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{TaskConfig, Tool};

/// Common task interface for executor graph handling.
pub trait TaskLike: Clone + Send + Sync {
    fn dependencies(&self) -> &[String];
}

impl TaskLike for TaskConfig {
    fn dependencies(&self) -> &[String] {
        &self.needs
    }
}

/// What an agent is asked to do: one fully resolved, template-expanded task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTask {
    pub name: String,
    pub agent: String,
    pub tool: Tool,
    pub model: Option<String>,
    pub prompt: String,
    pub write: bool,
    pub workdir: Option<PathBuf>,
}

/// What an agent reports back once the external process has exited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl AgentOutput {
    pub fn from_exit(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            success: exit_code == 0,
        }
    }
}
