use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::store::read_json;
use crate::error::StoreError;
use crate::executor::RunResult;

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub run_id: String,
    pub project: String,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub success: bool,
    pub task_count: usize,
    pub duration_ms: u64,
    pub run_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Only this project; `None` means all.
    pub project: Option<String>,
    /// Maximum sessions returned; 0 means no limit.
    pub limit: usize,
    pub failed_only: bool,
}

/// Past runs under `root`, newest first.
///
/// Run directories without a readable `run.json` are still listed, with
/// only their id and project filled in.
pub fn list_sessions(root: &Path, filter: &SessionFilter) -> Result<Vec<SessionInfo>, StoreError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    match &filter.project {
        Some(project) => {
            let dir = root.join(project);
            if dir.is_dir() {
                sessions = project_sessions(&dir, project)?;
            }
        }
        None => {
            for project in list_projects(root)? {
                match project_sessions(&root.join(&project), &project) {
                    Ok(mut found) => sessions.append(&mut found),
                    Err(e) => tracing::debug!(project = %project, error = %e, "skipping project"),
                }
            }
        }
    }

    if filter.failed_only {
        sessions.retain(|s| !s.success);
    }
    sessions.sort_by(|a, b| {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| b.run_id.cmp(&a.run_id))
    });
    if filter.limit > 0 {
        sessions.truncate(filter.limit);
    }
    Ok(sessions)
}

pub fn get_session(root: &Path, project: &str, run_id: &str) -> Result<RunResult, StoreError> {
    let path = root
        .join(project)
        .join(format!("run-{run_id}"))
        .join("run.json");
    if !path.exists() {
        return Err(StoreError::SessionNotFound {
            project: project.to_string(),
            run_id: run_id.to_string(),
        });
    }
    read_json(&path)
}

/// Project directory names, sorted.
pub fn list_projects(root: &Path) -> Result<Vec<String>, StoreError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut projects: Vec<String> = read_dir(root)?
        .filter(|(_, path)| path.is_dir())
        .map(|(name, _)| name)
        .collect();
    projects.sort();
    Ok(projects)
}

fn project_sessions(dir: &Path, project: &str) -> Result<Vec<SessionInfo>, StoreError> {
    Ok(read_dir(dir)?
        .filter(|(_, path)| path.is_dir())
        .filter_map(|(name, path)| {
            let run_id = name.strip_prefix("run-")?.to_string();
            Some(session_info(path, run_id, project))
        })
        .collect())
}

fn session_info(run_dir: PathBuf, run_id: String, project: &str) -> SessionInfo {
    match read_json::<RunResult>(&run_dir.join("run.json")) {
        Ok(run) => SessionInfo {
            duration_ms: run.duration_ms(),
            run_id: run.run_id,
            project: project.to_string(),
            start_time: Some(run.start_time),
            end_time: run.end_time,
            success: run.success,
            task_count: run.tasks.len(),
            run_dir,
        },
        Err(e) => {
            tracing::debug!(run_dir = %run_dir.display(), error = %e, "incomplete session");
            SessionInfo {
                run_id,
                project: project.to_string(),
                start_time: None,
                end_time: None,
                success: false,
                task_count: 0,
                duration_ms: 0,
                run_dir,
            }
        }
    }
}

fn read_dir(dir: &Path) -> Result<impl Iterator<Item = (String, PathBuf)>, StoreError> {
    let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries.filter_map(Result::ok).map(|e| {
        (
            e.file_name().to_string_lossy().to_string(),
            e.path(),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ResultSink;
    use crate::state::FileStore;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn save_run(root: &Path, project: &str, run_id: &str, minutes_ago: i64, success: bool) {
        let store = FileStore::create_with_id(root, project, run_id).unwrap();
        let mut run = RunResult::new(run_id);
        run.start_time = Local::now() - Duration::minutes(minutes_ago);
        run.end_time = Some(run.start_time + Duration::seconds(5));
        run.success = success;
        store.save_run_result(&run).unwrap();
    }

    #[test]
    fn lists_newest_first_across_projects() {
        let dir = tempdir().unwrap();
        save_run(dir.path(), "alpha", "old", 30, true);
        save_run(dir.path(), "beta", "new", 1, false);
        save_run(dir.path(), "alpha", "mid", 10, true);

        let all = list_sessions(dir.path(), &SessionFilter::default()).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.run_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(all[0].project, "beta");
        assert_eq!(all[0].duration_ms, 5_000);
    }

    #[test]
    fn filters_by_project_failure_and_limit() {
        let dir = tempdir().unwrap();
        save_run(dir.path(), "alpha", "a1", 3, false);
        save_run(dir.path(), "alpha", "a2", 2, true);
        save_run(dir.path(), "alpha", "a3", 1, false);
        save_run(dir.path(), "beta", "b1", 0, false);

        let filter = SessionFilter {
            project: Some("alpha".into()),
            limit: 1,
            failed_only: true,
        };
        let found = list_sessions(dir.path(), &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].run_id, "a3");
    }

    #[test]
    fn missing_root_lists_nothing() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("none");
        assert!(list_sessions(&root, &SessionFilter::default()).unwrap().is_empty());
        assert!(list_projects(&root).unwrap().is_empty());
    }

    #[test]
    fn run_dir_without_run_json_is_listed_bare() {
        let dir = tempdir().unwrap();
        FileStore::create_with_id(dir.path(), "p", "crashed").unwrap();
        let found = list_sessions(dir.path(), &SessionFilter::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].run_id, "crashed");
        assert_eq!(found[0].start_time, None);
    }

    #[test]
    fn get_session_round_trips_and_reports_missing() {
        let dir = tempdir().unwrap();
        save_run(dir.path(), "p", "r1", 0, true);
        let run = get_session(dir.path(), "p", "r1").unwrap();
        assert!(run.success);
        assert!(matches!(
            get_session(dir.path(), "p", "r2"),
            Err(StoreError::SessionNotFound { .. })
        ));
        assert_eq!(list_projects(dir.path()).unwrap(), vec!["p"]);
    }
}
