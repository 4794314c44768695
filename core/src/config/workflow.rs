use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A parsed `Cortexfile.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Working directory for every agent; relative paths resolve against the workflow file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,

    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,

    #[serde(default)]
    pub tasks: BTreeMap<String, TaskConfig>,

    #[serde(default)]
    pub settings: WorkflowSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Tool identifier, kept as written so validation can report unknown values.
    #[serde(default)]
    pub tool: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub agent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Path relative to the workflow file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<String>,

    /// Shell command, only for agents backed by the `shell` tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub needs: Vec<String>,

    #[serde(default)]
    pub write: bool,

    /// Contents of `prompt_file`, filled in by the loader.
    #[serde(skip)]
    pub resolved_prompt: Option<String>,
}

impl TaskConfig {
    pub fn has_prompt(&self) -> bool {
        non_empty(&self.prompt).is_some()
    }

    pub fn has_prompt_file(&self) -> bool {
        non_empty(&self.prompt_file).is_some()
    }

    pub fn has_command(&self) -> bool {
        non_empty(&self.command).is_some()
    }

    /// The text handed to the agent: the shell command, the file contents, or the inline prompt.
    pub fn prompt_text(&self) -> Option<&str> {
        non_empty(&self.command)
            .or_else(|| non_empty(&self.resolved_prompt))
            .or_else(|| non_empty(&self.prompt))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Per-workflow overrides of the global `[settings]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn needs_accepts_string_or_list() {
        let yaml = r#"
agents:
  dev:
    tool: claude-code
tasks:
  a:
    agent: dev
    prompt: one
  b:
    agent: dev
    prompt: two
    needs: a
  c:
    agent: dev
    prompt: three
    needs: [a, b]
"#;
        let cfg: WorkflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.tasks["a"].needs, Vec::<String>::new());
        assert_eq!(cfg.tasks["b"].needs, vec!["a"]);
        assert_eq!(cfg.tasks["c"].needs, vec!["a", "b"]);
        assert!(!cfg.tasks["c"].write);
    }

    #[test]
    fn prompt_text_prefers_command_then_file() {
        let mut task = TaskConfig {
            prompt: Some("inline".into()),
            ..Default::default()
        };
        assert_eq!(task.prompt_text(), Some("inline"));
        task.resolved_prompt = Some("from file".into());
        assert_eq!(task.prompt_text(), Some("from file"));
        task.command = Some("echo hi".into());
        assert_eq!(task.prompt_text(), Some("echo hi"));
    }

    #[test]
    fn blank_prompt_counts_as_missing() {
        let task = TaskConfig {
            prompt: Some("   ".into()),
            ..Default::default()
        };
        assert!(!task.has_prompt());
        assert_eq!(task.prompt_text(), None);
    }
}
