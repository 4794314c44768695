use thiserror::Error;

use super::{AgentError, ErrorCode};
use crate::config::Tool;

/// Errors raised while planning or executing a workflow.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("cycle detected: only processed {processed} of {total} tasks")]
    CycleDetected { processed: usize, total: usize },

    #[error("task '{task}' references undefined agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("unsupported tool '{0}'")]
    UnsupportedTool(String),

    #[error("task '{0}' has no prompt")]
    MissingPrompt(String),

    #[error("no adapter registered for tool \"{tool}\" (task '{task}')")]
    NoAdapter { task: String, tool: Tool },

    #[error("task '{task}' failed with exit code {exit_code}")]
    TaskFailed { task: String, exit_code: i32 },

    #[error("task '{task}' failed: {source}")]
    Agent {
        task: String,
        #[source]
        source: AgentError,
    },

    #[error("level {level} failed ({}): {source}", failed.join(", "))]
    LevelFailed {
        level: usize,
        failed: Vec<String>,
        #[source]
        source: Box<ExecutorError>,
    },

    #[error("run cancelled")]
    Cancelled,

    #[error("worker error: {0}")]
    Worker(String),
}

impl ExecutorError {
    /// Map executor error to a stable error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::CycleDetected { .. } => ErrorCode::CircularDependency,
            Self::UnknownAgent { .. }
            | Self::UnsupportedTool(_)
            | Self::MissingPrompt(_)
            | Self::NoAdapter { .. } => ErrorCode::ConfigError,
            Self::TaskFailed { .. } => ErrorCode::WorkflowFailed,
            Self::Agent { source, .. } => source.error_code(),
            Self::LevelFailed { source, .. } => source.error_code(),
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Worker(_) => ErrorCode::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Agent { source, .. } => matches!(source, AgentError::Cancelled),
            Self::LevelFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_failure_reports_inner_code() {
        let err = ExecutorError::LevelFailed {
            level: 1,
            failed: vec!["a".into(), "b".into()],
            source: Box::new(ExecutorError::TaskFailed {
                task: "a".into(),
                exit_code: 2,
            }),
        };
        assert_eq!(err.error_code(), ErrorCode::WorkflowFailed);
        assert_eq!(
            err.to_string(),
            "level 1 failed (a, b): task 'a' failed with exit code 2"
        );
    }

    #[test]
    fn cancelled_agent_counts_as_cancelled() {
        let err = ExecutorError::Agent {
            task: "a".into(),
            source: AgentError::Cancelled,
        };
        assert!(err.is_cancelled());
        assert_eq!(err.error_code(), ErrorCode::Cancelled);
    }
}
