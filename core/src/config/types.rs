use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::workflow::{WorkflowConfig, WorkflowSettings};

/// Global configuration, read from `<cortex home>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,

    /// Root of the session store. Defaults to `<cortex home>/sessions`.
    #[serde(default)]
    pub sessions_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory`.
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "cortex_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Directory for log files. Defaults to `<cortex home>/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Values applied to agents that leave `tool` or `model` empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub tool: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Upper bound on concurrently running tasks; 0 means one per CPU.
    #[serde(default)]
    pub max_parallel: usize,

    #[serde(default)]
    pub verbose: bool,

    /// Mirror agent output to the terminal while it runs.
    #[serde(default)]
    pub stream: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            max_parallel: 0,
            verbose: false,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,

    /// Event names to deliver; empty or `*` means all.
    #[serde(default)]
    pub events: Vec<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl WebhookConfig {
    pub fn matches_event(&self, event: &str) -> bool {
        self.events.is_empty() || self.events.iter().any(|e| e == "*" || e == event)
    }
}

/// Settings given on the command line; `None` leaves the lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub parallel: Option<bool>,
    pub max_parallel: Option<usize>,
    pub verbose: Option<bool>,
    pub stream: Option<bool>,
}

/// Effective settings after layering CLI > workflow > global > built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub parallel: bool,
    /// Always at least 1.
    pub max_parallel: usize,
    pub verbose: bool,
    pub stream: bool,
}

impl AppConfig {
    pub fn resolve_settings(
        &self,
        local: &WorkflowSettings,
        cli: &SettingsOverrides,
    ) -> RunSettings {
        let global = &self.settings;
        let max_parallel = cli
            .max_parallel
            .or(local.max_parallel)
            .unwrap_or(global.max_parallel);
        RunSettings {
            parallel: cli.parallel.or(local.parallel).unwrap_or(global.parallel),
            max_parallel: if max_parallel == 0 {
                num_cpus::get().max(1)
            } else {
                max_parallel
            },
            verbose: cli.verbose.or(local.verbose).unwrap_or(global.verbose),
            stream: cli.stream.or(local.stream).unwrap_or(global.stream),
        }
    }

    /// Fill in `tool` and `model` for agents that omit them.
    pub fn apply_defaults(&self, workflow: &mut WorkflowConfig) {
        for agent in workflow.agents.values_mut() {
            if agent.tool.trim().is_empty() {
                if let Some(tool) = &self.defaults.tool {
                    agent.tool = tool.clone();
                }
            }
            if agent.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
                if let Some(model) = &self.defaults.model {
                    agent.model = Some(model.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn toml_defaults_fill_missing_fields() {
        let cfg: AppConfig = toml::from_str(
            r#"
[settings]
max_parallel = 3

[[webhooks]]
url = "http://localhost/hook"
events = ["task_failed"]
"#,
        )
        .unwrap();
        assert!(cfg.settings.parallel);
        assert_eq!(cfg.settings.max_parallel, 3);
        assert_eq!(cfg.logging.level, "warn");
        assert!(cfg.webhooks[0].matches_event("task_failed"));
        assert!(!cfg.webhooks[0].matches_event("run_start"));
    }

    #[test]
    fn wildcard_and_empty_events_match_everything() {
        let all = WebhookConfig {
            url: "u".into(),
            ..Default::default()
        };
        let star = WebhookConfig {
            url: "u".into(),
            events: vec!["*".into()],
            ..Default::default()
        };
        assert!(all.matches_event("run_start"));
        assert!(star.matches_event("task_complete"));
    }

    #[test]
    fn cli_beats_workflow_beats_global() {
        let mut cfg = AppConfig::default();
        cfg.settings.max_parallel = 8;
        cfg.settings.verbose = true;
        let local = WorkflowSettings {
            parallel: Some(false),
            max_parallel: Some(4),
            ..Default::default()
        };
        let cli = SettingsOverrides {
            max_parallel: Some(2),
            ..Default::default()
        };
        let s = cfg.resolve_settings(&local, &cli);
        assert_eq!(
            s,
            RunSettings {
                parallel: false,
                max_parallel: 2,
                verbose: true,
                stream: false,
            }
        );
    }

    #[test]
    fn zero_max_parallel_falls_back_to_cpus() {
        let cfg = AppConfig::default();
        let s = cfg.resolve_settings(&WorkflowSettings::default(), &SettingsOverrides::default());
        assert!(s.max_parallel >= 1);
        assert!(s.parallel);
    }

    #[test]
    fn defaults_only_fill_gaps() {
        let cfg = AppConfig {
            defaults: DefaultsConfig {
                tool: Some("claude-code".into()),
                model: Some("sonnet".into()),
            },
            ..Default::default()
        };
        let mut wf = WorkflowConfig::default();
        wf.agents.insert("bare".into(), AgentConfig::default());
        wf.agents.insert(
            "set".into(),
            AgentConfig {
                tool: "shell".into(),
                model: Some("x".into()),
            },
        );
        cfg.apply_defaults(&mut wf);
        assert_eq!(wf.agents["bare"].tool, "claude-code");
        assert_eq!(wf.agents["bare"].model.as_deref(), Some("sonnet"));
        assert_eq!(wf.agents["set"].tool, "shell");
        assert_eq!(wf.agents["set"].model.as_deref(), Some("x"));
    }
}
