#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cortex_core::config::parse_workflow;
use cortex_core::error::AgentError;
use cortex_core::executor::{
    build_plan, Agent, AgentOutput, AgentRegistry, AgentTask, ExecutionObserver, ExecutionPlan,
    RunEvent,
};
use cortex_core::config::Tool;
use tokio_util::sync::CancellationToken;

/// Agent that echoes `out:<prompt>` after a short delay and tracks concurrency.
#[derive(Default)]
pub struct MockAgent {
    pub fail: HashSet<String>,
    pub panic: HashSet<String>,
    pub delay: Duration,
    /// Never finish on its own; only cancellation ends a task.
    pub hang: bool,
    pub dispatched: Mutex<Vec<String>>,
    pub running: AtomicUsize,
    pub peak: AtomicUsize,
}

impl MockAgent {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(20),
            ..Self::default()
        }
    }

    pub fn failing(mut self, tasks: &[&str]) -> Self {
        self.fail = tasks.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn panicking(mut self, tasks: &[&str]) -> Self {
        self.panic = tasks.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        task: &AgentTask,
        cancel: &CancellationToken,
    ) -> Result<AgentOutput, AgentError> {
        self.dispatched.lock().unwrap().push(task.name.clone());
        if self.panic.contains(&task.name) {
            panic!("adapter bug in {}", task.name);
        }
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let wait = if self.hang {
            Duration::from_secs(3600)
        } else {
            self.delay
        };
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(wait) => false,
            _ = cancel.cancelled() => true,
        };
        self.running.fetch_sub(1, Ordering::SeqCst);

        if cancelled {
            return Err(AgentError::Cancelled);
        }
        let code = if self.fail.contains(&task.name) { 1 } else { 0 };
        Ok(AgentOutput::from_exit(
            format!("out:{}", task.prompt),
            String::new(),
            code,
        ))
    }
}

pub fn registry(agent: Arc<MockAgent>) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register(Tool::ClaudeCode, agent);
    registry
}

pub fn plan(yaml: &str) -> ExecutionPlan {
    let workflow = parse_workflow(yaml, Path::new("Cortexfile.yml")).unwrap();
    build_plan(&workflow).unwrap()
}

/// Records a short tag per event, e.g. `task_start:a`.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ExecutionObserver for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_event(&self, event: &RunEvent) {
        let tag = match event {
            RunEvent::RunStart { .. } => "run_start".to_string(),
            RunEvent::LevelStart { index, .. } => format!("level_start:{index}"),
            RunEvent::TaskStart { task, .. } => format!("task_start:{task}"),
            RunEvent::TaskComplete { result, .. } => format!("task_complete:{}", result.task_name),
            RunEvent::LevelEnd { index, .. } => format!("level_end:{index}"),
            RunEvent::RunEnd { .. } => "run_end".to_string(),
        };
        self.events.lock().unwrap().push(tag);
    }
}
