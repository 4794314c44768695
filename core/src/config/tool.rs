use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External tools a workflow agent can be backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "claude-code")]
    ClaudeCode,
    #[serde(rename = "opencode")]
    OpenCode,
    #[serde(rename = "shell")]
    Shell,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::ClaudeCode, Tool::OpenCode, Tool::Shell];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::ClaudeCode => "claude-code",
            Tool::OpenCode => "opencode",
            Tool::Shell => "shell",
        }
    }

    /// Comma separated list used in validation hints.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "claude-code" => Ok(Tool::ClaudeCode),
            "opencode" => Ok(Tool::OpenCode),
            "shell" => Ok(Tool::Shell),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tools() {
        assert_eq!("claude-code".parse::<Tool>(), Ok(Tool::ClaudeCode));
        assert_eq!(" opencode ".parse::<Tool>(), Ok(Tool::OpenCode));
        assert_eq!("shell".parse::<Tool>(), Ok(Tool::Shell));
        assert_eq!("gemini".parse::<Tool>(), Err("gemini".to_string()));
    }

    #[test]
    fn serializes_as_kebab_name() {
        let json = serde_json::to_string(&Tool::ClaudeCode).unwrap();
        assert_eq!(json, "\"claude-code\"");
        assert_eq!(Tool::supported_list(), "claude-code, opencode, shell");
    }
}
