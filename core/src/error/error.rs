use std::path::PathBuf;

use thiserror::Error;

use super::{ErrorCode, ExecutorError, ValidationErrors};

/// Top-level failure of a CLI command.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Executor(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Command(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Anyhow(_) => ErrorCode::Internal,
        }
    }
}

/// Failures while locating or parsing configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no workflow file found in {dir} (looked for {candidates})")]
    NotFound { dir: PathBuf, candidates: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("prompt file {path} for task '{task}' could not be read: {source}")]
    PromptFile {
        task: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("home directory could not be determined")]
    NoHome,
}

impl ConfigError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::PromptFile { .. } => ErrorCode::IoError,
            _ => ErrorCode::ConfigError,
        }
    }
}

/// Transport-level failures reported by an agent adapter.
///
/// A process that ran and exited non-zero is not an `AgentError`; adapters
/// report that through `AgentOutput::success`.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("{program} is not available: {reason}")]
    Unavailable { program: String, reason: String },
    #[error("invalid task: {0}")]
    InvalidTask(String),
    #[error("cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Spawn { .. } | Self::Unavailable { .. } => ErrorCode::SpawnError,
            Self::StreamIo { .. } => ErrorCode::IoError,
            Self::InvalidTask(_) => ErrorCode::ConfigError,
            Self::Cancelled => ErrorCode::Cancelled,
        }
    }
}

/// Failures from the on-disk session store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid json in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("session not found: {project}/{run_id}")]
    SessionNotFound { project: String, run_id: String },
}

impl StoreError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::IoError,
            Self::Json { .. } => ErrorCode::Internal,
            Self::SessionNotFound { .. } => ErrorCode::ConfigError,
        }
    }
}
