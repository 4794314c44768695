use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::Tool;
use crate::error::AgentError;
use crate::executor::types::{AgentOutput, AgentTask};

/// An external tool that can carry out one task.
///
/// A process that runs and exits non-zero is `Ok` with `success == false`;
/// `Err` is reserved for failing to run it at all. Implementations must stop
/// the underlying process when `cancel` fires and return `AgentError::Cancelled`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        task: &AgentTask,
        cancel: &CancellationToken,
    ) -> Result<AgentOutput, AgentError>;

    /// Probe that the tool is installed and runnable.
    async fn check(&self) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Agents keyed by the tool they implement.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<Tool, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `agent` for `tool`, replacing any previous one.
    pub fn register(&mut self, tool: Tool, agent: Arc<dyn Agent>) -> &mut Self {
        self.agents.insert(tool, agent);
        self
    }

    pub fn get(&self, tool: Tool) -> Option<Arc<dyn Agent>> {
        self.agents.get(&tool).cloned()
    }

    pub fn has(&self, tool: Tool) -> bool {
        self.agents.contains_key(&tool)
    }

    pub fn tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.agents.keys().copied().collect();
        tools.sort();
        tools
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("tools", &self.tools())
            .finish()
    }
}
