use std::sync::Mutex;

use crate::executor::{ResultSink, RunResult, TaskResult};

/// Keeps results in memory; used when persistence is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    tasks: Mutex<Vec<TaskResult>>,
    runs: Mutex<Vec<RunResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_results(&self) -> Vec<TaskResult> {
        match self.tasks.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn run_results(&self) -> Vec<RunResult> {
        match self.runs.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ResultSink for MemorySink {
    fn save_task_result(&self, result: &TaskResult) -> anyhow::Result<()> {
        self.tasks
            .lock()
            .map_err(|_| anyhow::anyhow!("task result lock poisoned"))?
            .push(result.clone());
        Ok(())
    }

    fn save_run_result(&self, result: &RunResult) -> anyhow::Result<()> {
        self.runs
            .lock()
            .map_err(|_| anyhow::anyhow!("run result lock poisoned"))?
            .push(result.clone());
        Ok(())
    }
}
