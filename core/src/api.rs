//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `cortex_core::api` instead of reaching into internal modules.

pub use crate::config::{
    cortex_home, load_default, load_workflow, resolve_workflow_files, sessions_root, validate,
    AppConfig, LoggingConfig, RunSettings, SettingsOverrides, Tool, WebhookConfig, WorkflowConfig,
};
pub use crate::error::{
    AgentError, CliError, ConfigError, ErrorCode, ExecutorError, StoreError, ValidationErrors,
};
pub use crate::executor::{
    build_levels, build_plan, generate_run_id, max_parallelism, Agent, AgentOutput,
    AgentRegistry, AgentTask, ExecutionLevel, ExecutionMode, ExecutionObserver, ExecutionOpts,
    ExecutionPlan, Executor, NoopSink, ProgressMonitor, ResultSink, RunEvent, RunOutcome,
    RunResult, RunStatus, TaskResult,
};
pub use crate::state::{
    get_session, list_projects, list_sessions, FileStore, MemorySink, SessionFilter, SessionInfo,
};
pub use crate::util::{format_duration, format_precise, project_name};
