use crate::executor::types::{RunResult, TaskResult};

/// Destination for results as a run progresses.
///
/// The executor logs failures from these calls and carries on.
pub trait ResultSink: Send + Sync {
    fn save_task_result(&self, result: &TaskResult) -> anyhow::Result<()>;
    fn save_run_result(&self, result: &RunResult) -> anyhow::Result<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn save_task_result(&self, _result: &TaskResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn save_run_result(&self, _result: &RunResult) -> anyhow::Result<()> {
        Ok(())
    }
}
