use std::path::{Path, PathBuf};

use super::types::AppConfig;
use super::workflow::WorkflowConfig;
use crate::error::ConfigError;

/// Workflow file names tried, in order, when none is given explicitly.
pub const WORKFLOW_FILE_NAMES: [&str; 6] = [
    "Cortexfile.yml",
    "Cortexfile.yaml",
    "cortexfile.yml",
    "cortexfile.yaml",
    "Agentfile.yml",
    "Agentfile.yaml",
];

/// Get the cortex data directory: `$CORTEX_HOME` or `~/.cortex`
pub fn cortex_home() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("CORTEX_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".cortex"))
        .ok_or(ConfigError::NoHome)
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    let home = cortex_home()?;
    let mut cfg = load_from(&home.join("config.toml"))?;

    if cfg
        .logging
        .directory
        .as_ref()
        .map_or(true, |s| s.trim().is_empty())
    {
        cfg.logging.directory = Some(home.join("logs").to_string_lossy().to_string());
    }
    if cfg
        .sessions_dir
        .as_ref()
        .map_or(true, |s| s.trim().is_empty())
    {
        cfg.sessions_dir = Some(home.join("sessions").to_string_lossy().to_string());
    }

    // Environment variable overrides (highest priority)
    if let Ok(v) = std::env::var("CORTEX_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
    if let Ok(v) = std::env::var("CORTEX_MAX_PARALLEL") {
        match v.trim().parse::<usize>() {
            Ok(n) => cfg.settings.max_parallel = n,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid CORTEX_MAX_PARALLEL"),
        }
    }

    Ok(cfg)
}

/// Root of the session store: `sessions_dir` if set, else `<cortex home>/sessions`.
pub fn sessions_root(cfg: &AppConfig) -> Result<PathBuf, ConfigError> {
    match cfg.sessions_dir.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(cortex_home()?.join("sessions")),
    }
}

/// Read a global config file; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no global config, using defaults");
        return Ok(AppConfig::default());
    }
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn find_workflow_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    WORKFLOW_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::NotFound {
            dir: dir.to_path_buf(),
            candidates: WORKFLOW_FILE_NAMES.join(", "),
        })
}

/// Expand `-f` arguments into concrete files.
///
/// Arguments containing glob metacharacters are expanded and sorted; plain
/// paths are taken as given. With no arguments the default file in `cwd` is used.
pub fn resolve_workflow_files(patterns: &[String], cwd: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if patterns.is_empty() {
        return Ok(vec![find_workflow_file(cwd)?]);
    }

    let mut files = Vec::new();
    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            cwd.join(pattern)
        };

        if !pattern.contains(['*', '?', '[']) {
            files.push(full);
            continue;
        }

        let full_pattern = full.to_string_lossy().to_string();
        let paths = glob::glob(&full_pattern).map_err(|e| ConfigError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        if matched.is_empty() {
            return Err(ConfigError::Pattern {
                pattern: pattern.clone(),
                message: "no files match".to_string(),
            });
        }
        matched.sort();
        files.append(&mut matched);
    }
    files.dedup();
    Ok(files)
}

/// Parse a workflow file and inline every `prompt_file` relative to it.
pub fn load_workflow(path: &Path) -> Result<WorkflowConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = parse_workflow(&s, path)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for (name, task) in cfg.tasks.iter_mut() {
        let Some(rel) = task.prompt_file.as_deref().filter(|p| !p.trim().is_empty()) else {
            continue;
        };
        let prompt_path = base.join(rel);
        let text = std::fs::read_to_string(&prompt_path).map_err(|source| {
            ConfigError::PromptFile {
                task: name.clone(),
                path: prompt_path.clone(),
                source,
            }
        })?;
        task.resolved_prompt = Some(text);
    }
    if let Some(dir) = cfg.workdir.as_deref().filter(|d| !d.trim().is_empty()) {
        cfg.workdir = Some(base.join(dir).to_string_lossy().to_string());
    }

    tracing::debug!(
        path = %path.display(),
        agents = cfg.agents.len(),
        tasks = cfg.tasks.len(),
        "workflow loaded"
    );
    Ok(cfg)
}

pub fn parse_workflow(s: &str, path: &Path) -> Result<WorkflowConfig, ConfigError> {
    if s.trim().is_empty() {
        return Ok(WorkflowConfig::default());
    }
    serde_yaml::from_str::<WorkflowConfig>(s).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn finds_first_matching_name() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Agentfile.yml"), "").unwrap();
        std::fs::write(dir.path().join("cortexfile.yaml"), "").unwrap();
        let found = find_workflow_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("cortexfile.yaml"));
    }

    #[test]
    fn missing_workflow_is_reported() {
        let dir = tempdir().unwrap();
        let err = find_workflow_file(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn prompt_file_is_resolved_relative_to_workflow() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/review.md"), "Review the code").unwrap();
        let path = dir.path().join("Cortexfile.yml");
        std::fs::write(
            &path,
            "agents:\n  dev:\n    tool: claude-code\ntasks:\n  review:\n    agent: dev\n    prompt_file: prompts/review.md\n",
        )
        .unwrap();

        let cfg = load_workflow(&path).unwrap();
        assert_eq!(cfg.tasks["review"].prompt_text(), Some("Review the code"));
    }

    #[test]
    fn sessions_root_prefers_configured_dir() {
        let cfg = AppConfig {
            sessions_dir: Some("/var/lib/cortex/sessions".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            sessions_root(&cfg).unwrap(),
            PathBuf::from("/var/lib/cortex/sessions")
        );
    }

    #[test]
    fn workdir_is_resolved_relative_to_workflow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cortexfile.yml");
        std::fs::write(&path, "workdir: app\nagents: {}\ntasks: {}\n").unwrap();
        let cfg = load_workflow(&path).unwrap();
        assert_eq!(
            cfg.workdir.map(PathBuf::from),
            Some(dir.path().join("app"))
        );
    }

    #[test]
    fn unreadable_prompt_file_names_the_task() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cortexfile.yml");
        std::fs::write(
            &path,
            "agents:\n  dev:\n    tool: claude-code\ntasks:\n  t:\n    agent: dev\n    prompt_file: nope.md\n",
        )
        .unwrap();
        match load_workflow(&path).unwrap_err() {
            ConfigError::PromptFile { task, .. } => assert_eq!(task, "t"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = parse_workflow("tasks: [unclosed", Path::new("x.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn glob_patterns_expand_sorted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.yml"), "").unwrap();
        std::fs::write(dir.path().join("a.yml"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = resolve_workflow_files(&["*.yml".to_string()], dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.yml"), dir.path().join("b.yml")]);
    }

    #[test]
    fn glob_without_matches_fails() {
        let dir = tempdir().unwrap();
        let err = resolve_workflow_files(&["*.yml".to_string()], dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }

    #[test]
    fn global_config_missing_uses_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_from(&dir.path().join("config.toml")).unwrap();
        assert!(cfg.settings.parallel);
        assert!(cfg.webhooks.is_empty());
    }
}
