use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::status::RunStatus;
use super::task::{AgentOutput, AgentTask};
use crate::config::Tool;
use crate::util::format_precise;

/// Outcome of a single task.
///
/// Created when the task begins and completed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub agent: String,
    pub tool: Tool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// The prompt actually sent, after template expansion.
    pub prompt: String,
    pub stdout: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub duration_ms: u64,
    /// `duration_ms` rounded to 100ms, for humans.
    #[serde(default)]
    pub duration: String,
}

impl TaskResult {
    pub fn start(task: &AgentTask) -> Self {
        Self {
            task_name: task.name.clone(),
            agent: task.agent.clone(),
            tool: task.tool,
            model: task.model.clone(),
            prompt: task.prompt.clone(),
            stdout: String::new(),
            stderr: String::new(),
            success: false,
            exit_code: 0,
            start_time: Local::now(),
            end_time: None,
            duration_ms: 0,
            duration: String::new(),
        }
    }

    pub fn complete(mut self, output: AgentOutput) -> Self {
        let end = Local::now();
        let ms = (end - self.start_time).num_milliseconds().max(0) as u64;
        self.stdout = output.stdout;
        self.stderr = output.stderr;
        self.exit_code = output.exit_code;
        self.success = output.success;
        self.end_time = Some(end);
        self.duration_ms = ms;
        self.duration = format_precise(ms);
        self
    }

    /// Complete as a failure that never produced process output.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.complete(AgentOutput {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: 1,
            success: false,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Run identifier from the local clock, e.g. `20240131-142501`.
pub fn generate_run_id() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Aggregate outcome of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    #[serde(default)]
    pub status: RunStatus,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    /// True only if every task that ran succeeded and none were skipped.
    pub success: bool,
    /// Task results in completion order.
    pub tasks: Vec<TaskResult>,
}

impl RunResult {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            status: RunStatus::NotStarted,
            start_time: Local::now(),
            end_time: None,
            success: false,
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, name: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|t| t.task_name == name)
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskResult> {
        self.tasks.iter().filter(|t| !t.success)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Move to `to`, logging and ignoring transitions the lifecycle forbids.
    pub(crate) fn transition(&mut self, to: RunStatus) {
        match self.status.validate(to) {
            Ok(()) => {
                tracing::debug!(run_id = %self.run_id, from = ?self.status, to = ?to, "run status");
                self.status = to;
            }
            Err(e) => tracing::warn!(run_id = %self.run_id, error = %e, "ignored run status change"),
        }
    }

    /// Stamp the end time and settle the final status from the outcome.
    pub(crate) fn finish(&mut self, success: bool) {
        self.end_time = Some(Local::now());
        self.success = success;
        self.transition(if success {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> AgentTask {
        AgentTask {
            name: "build".into(),
            agent: "dev".into(),
            tool: Tool::Shell,
            model: None,
            prompt: "make".into(),
            write: false,
            workdir: None,
        }
    }

    #[test]
    fn complete_copies_output_and_stamps_end() {
        let result = TaskResult::start(&task()).complete(AgentOutput::from_exit(
            "ok".into(),
            String::new(),
            0,
        ));
        assert!(result.success);
        assert!(result.is_complete());
        assert_eq!(result.stdout, "ok");
        assert!(!result.duration.is_empty());
    }

    #[test]
    fn fail_records_message_as_stderr() {
        let result = TaskResult::start(&task()).fail("no adapter");
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "no adapter");
    }

    #[test]
    fn json_omits_empty_optional_fields() {
        let result = TaskResult::start(&task()).complete(AgentOutput::from_exit(
            "x".into(),
            String::new(),
            0,
        ));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tool"], "shell");
        assert!(json.get("model").is_none());
        assert!(json.get("stderr").is_none());
        let back: TaskResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.task_name, "build");
    }

    #[test]
    fn run_id_is_timestamp_shaped() {
        let id = generate_run_id();
        assert_eq!(id.len(), 15);
        assert_eq!(id.as_bytes()[8], b'-');
    }

    #[test]
    fn finish_settles_status() {
        let mut run = RunResult::new("r1");
        run.transition(RunStatus::Running);
        run.finish(false);
        assert_eq!(run.status, RunStatus::Failed);
        assert!(!run.success);
        assert!(run.end_time.is_some());
    }
}
