use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StoreError;
use crate::executor::{generate_run_id, ResultSink, RunResult, TaskResult};

/// Writes each task result (`task-<name>.json`) and the final run result
/// (`run.json`) as pretty JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    run_id: String,
    run_dir: PathBuf,
}

impl FileStore {
    /// Create the run directory for a new run of `project` with a fresh id.
    pub fn create(root: &Path, project: &str) -> Result<Self, StoreError> {
        Self::create_with_id(root, project, &generate_run_id())
    }

    /// Create the run directory for `run_id`.
    ///
    /// Ids are only unique to the second, so a taken id gets a `-2`, `-3`, ...
    /// suffix.
    pub fn create_with_id(root: &Path, project: &str, run_id: &str) -> Result<Self, StoreError> {
        let project_dir = root.join(project);
        std::fs::create_dir_all(&project_dir).map_err(|source| StoreError::Io {
            path: project_dir.clone(),
            source,
        })?;

        let mut id = run_id.to_string();
        let mut attempt = 1;
        loop {
            let run_dir = project_dir.join(format!("run-{id}"));
            match std::fs::create_dir(&run_dir) {
                Ok(()) => {
                    tracing::debug!(run_dir = %run_dir.display(), "session directory created");
                    return Ok(Self { run_id: id, run_dir });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                    id = format!("{run_id}-{attempt}");
                }
                Err(source) => {
                    return Err(StoreError::Io {
                        path: run_dir,
                        source,
                    })
                }
            }
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn load_task_result(&self, task: &str) -> Result<TaskResult, StoreError> {
        read_json(&self.task_path(task))
    }

    fn task_path(&self, task: &str) -> PathBuf {
        let stem: String = task
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.run_dir.join(format!("task-{stem}.json"))
    }
}

impl ResultSink for FileStore {
    fn save_task_result(&self, result: &TaskResult) -> anyhow::Result<()> {
        write_json(&self.task_path(&result.task_name), result)?;
        Ok(())
    }

    fn save_run_result(&self, result: &RunResult) -> anyhow::Result<()> {
        write_json(&self.run_dir.join("run.json"), result)?;
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let data = std::fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
