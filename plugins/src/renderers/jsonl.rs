use chrono::Local;
use cortex_core::api::{ExecutionObserver, RunEvent};
use serde_json::{json, Value};

/// One JSON object per event on stdout.
pub struct JsonlRenderer;

impl JsonlRenderer {
    fn event_to_json(&self, event: &RunEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        match event {
            RunEvent::RunStart {
                run_id,
                total_tasks,
                total_levels,
            } => json!({
                "v": 1,
                "event_type": "run.start",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "total_tasks": total_tasks,
                    "total_levels": total_levels,
                }
            }),
            RunEvent::LevelStart {
                run_id,
                index,
                tasks,
            } => json!({
                "v": 1,
                "event_type": "level.start",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "level": index,
                    "tasks": tasks,
                }
            }),
            RunEvent::TaskStart {
                run_id,
                task,
                agent,
                tool,
                model,
            } => json!({
                "v": 1,
                "event_type": "task.start",
                "ts": ts,
                "run_id": run_id,
                "task_id": task,
                "metadata": {
                    "agent": agent,
                    "tool": tool,
                    "model": model,
                }
            }),
            RunEvent::TaskComplete { run_id, result } => json!({
                "v": 1,
                "event_type": "task.end",
                "ts": ts,
                "run_id": run_id,
                "task_id": result.task_name,
                "code": result.exit_code,
                "metadata": {
                    "duration_ms": result.duration_ms,
                    "success": result.success,
                    "stdout": result.stdout,
                    "stderr": result.stderr,
                }
            }),
            RunEvent::LevelEnd {
                run_id,
                index,
                failed,
            } => json!({
                "v": 1,
                "event_type": "level.end",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "level": index,
                    "failed": failed,
                }
            }),
            RunEvent::RunEnd { run_id, result } => json!({
                "v": 1,
                "event_type": "run.end",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "status": result.status,
                    "success": result.success,
                    "completed": result.tasks.len(),
                    "failed": result.failed_tasks().count(),
                    "duration_ms": result.duration_ms(),
                }
            }),
        }
    }
}

impl ExecutionObserver for JsonlRenderer {
    fn name(&self) -> &str {
        "jsonl-renderer"
    }

    fn on_event(&self, event: &RunEvent) {
        let value = self.event_to_json(event);
        println!(
            "{}",
            serde_json::to_string(&value).unwrap_or_else(|_| "{}".into())
        );
    }
}
