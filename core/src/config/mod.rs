//! Configuration: the global `config.toml`, workflow files, and their validation.

mod load;
mod tool;
mod types;
mod validate;
mod workflow;

pub use load::{
    cortex_home, find_workflow_file, load_default, load_from, load_workflow, parse_workflow,
    resolve_workflow_files, sessions_root, WORKFLOW_FILE_NAMES,
};
pub use tool::Tool;
pub use types::{
    AppConfig, DefaultsConfig, LoggingConfig, RunSettings, SettingsConfig, SettingsOverrides,
    WebhookConfig,
};
pub use validate::validate;
pub use workflow::{AgentConfig, TaskConfig, WorkflowConfig, WorkflowSettings};
