use crate::config::Tool;
use crate::executor::types::{RunResult, TaskResult};

/// Progress notifications emitted by the executor.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStart {
        run_id: String,
        total_tasks: usize,
        total_levels: usize,
    },
    LevelStart {
        run_id: String,
        index: usize,
        tasks: Vec<String>,
    },
    TaskStart {
        run_id: String,
        task: String,
        agent: String,
        tool: Tool,
        model: Option<String>,
    },
    TaskComplete {
        run_id: String,
        result: TaskResult,
    },
    LevelEnd {
        run_id: String,
        index: usize,
        failed: Vec<String>,
    },
    RunEnd {
        run_id: String,
        result: RunResult,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> &str {
        match self {
            RunEvent::RunStart { run_id, .. }
            | RunEvent::LevelStart { run_id, .. }
            | RunEvent::TaskStart { run_id, .. }
            | RunEvent::TaskComplete { run_id, .. }
            | RunEvent::LevelEnd { run_id, .. }
            | RunEvent::RunEnd { run_id, .. } => run_id,
        }
    }
}

/// Receives `RunEvent`s synchronously from executor workers; must not block.
pub trait ExecutionObserver: Send + Sync {
    fn name(&self) -> &str;
    fn on_event(&self, event: &RunEvent);
}
