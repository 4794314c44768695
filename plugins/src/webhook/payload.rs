use chrono::{DateTime, Local};
use cortex_core::api::{format_precise, RunResult, TaskResult, Tool};
use serde::Serialize;

pub const EVENT_RUN_START: &str = "run_start";
pub const EVENT_RUN_COMPLETE: &str = "run_complete";
pub const EVENT_TASK_START: &str = "task_start";
pub const EVENT_TASK_COMPLETE: &str = "task_complete";
pub const EVENT_TASK_FAILED: &str = "task_failed";

/// JSON body posted to a webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEvent {
    pub event: &'static str,
    pub timestamp: DateTime<Local>,
    pub run_id: String,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub name: String,
    pub agent: String,
    pub tool: Tool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunPayload {
    pub task_count: usize,
    pub duration: String,
    pub success: bool,
}

impl WebhookEvent {
    fn new(event: &'static str, run_id: &str, project: &str) -> Self {
        Self {
            event,
            timestamp: Local::now(),
            run_id: run_id.to_string(),
            project: project.to_string(),
            task: None,
            run: None,
        }
    }

    pub fn run_start(run_id: &str, project: &str) -> Self {
        Self::new(EVENT_RUN_START, run_id, project)
    }

    pub fn run_complete(project: &str, result: &RunResult) -> Self {
        let mut event = Self::new(EVENT_RUN_COMPLETE, &result.run_id, project);
        event.run = Some(RunPayload {
            task_count: result.tasks.len(),
            duration: format_precise(result.duration_ms()),
            success: result.success,
        });
        event
    }

    pub fn task_start(
        run_id: &str,
        project: &str,
        task: &str,
        agent: &str,
        tool: Tool,
        model: Option<&str>,
    ) -> Self {
        let mut event = Self::new(EVENT_TASK_START, run_id, project);
        event.task = Some(TaskPayload {
            name: task.to_string(),
            agent: agent.to_string(),
            tool,
            model: model.map(str::to_string),
            duration: String::new(),
            success: false,
            error: String::new(),
        });
        event
    }

    /// `task_complete` or `task_failed`, depending on the result.
    pub fn task_end(run_id: &str, project: &str, result: &TaskResult) -> Self {
        let name = if result.success {
            EVENT_TASK_COMPLETE
        } else {
            EVENT_TASK_FAILED
        };
        let error = if result.success {
            String::new()
        } else {
            result
                .stderr
                .lines()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| format!("exit code {}", result.exit_code))
        };
        let mut event = Self::new(name, run_id, project);
        event.task = Some(TaskPayload {
            name: result.task_name.clone(),
            agent: result.agent.clone(),
            tool: result.tool,
            model: result.model.clone(),
            duration: result.duration.clone(),
            success: result.success,
            error,
        });
        event
    }
}
