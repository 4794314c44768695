//! `cortex init`: write a starter workflow file.
use std::path::{Path, PathBuf};

use cortex_core::api::CliError;

use crate::commands::cli::InitArgs;
use crate::output::detect_painter;

const FILE_NAME: &str = "Cortexfile.yml";

const FULL_TEMPLATE: &str = r#"# Cortexfile.yml - cortex workflow
#
# Supported tools:
#   claude-code : Claude via the Claude Code CLI
#   opencode    : OpenCode CLI
#   shell       : shell commands (use `command` instead of `prompt`)
#
# Task options:
#   agent       : (required) agent defined below
#   prompt      : inline prompt text
#   prompt_file : prompt loaded from a file, relative to this one
#   command     : shell command, for shell agents
#   needs       : a task name or a list of them
#   write       : allow the agent to modify files (default: false)
#
# Use {{outputs.<task>}} to pass a dependency's output into a prompt.

# workdir: ./path/to/project

agents:
  analyzer:
    tool: claude-code
    model: sonnet

  reviewer:
    tool: claude-code
    model: sonnet

  coder:
    tool: claude-code
    model: opus

  builder:
    tool: shell

tasks:
  build:
    agent: builder
    command: |
      echo "Building project..."
      make build 2>&1 || echo "no build target, skipping"

  test:
    agent: builder
    command: make test
    needs: [build]

  analyze:
    agent: analyzer
    prompt: |
      Analyze the codebase structure and identify:
      1. Main components and their responsibilities
      2. Key dependencies
      3. Architecture patterns in use
      4. Areas for improvement

  review:
    agent: reviewer
    prompt: |
      Review the codebase for code quality issues, security problems,
      performance concerns and gaps in test coverage.

  implement:
    agent: coder
    needs: [analyze, review, test]
    write: true
    prompt: |
      Based on the analysis:
      {{outputs.analyze}}

      And the review findings:
      {{outputs.review}}

      Test results:
      {{outputs.test}}

      Implement the three most important improvements.

settings:
  parallel: true
  max_parallel: 4
  verbose: false
  stream: false
"#;

const MINIMAL_TEMPLATE: &str = r#"# Cortexfile.yml - minimal workflow
# Run with: cortex run

agents:
  assistant:
    tool: claude-code
    model: sonnet

  builder:
    tool: shell

tasks:
  build:
    agent: builder
    command: echo "Hello from shell!"

  main:
    agent: assistant
    needs: [build]
    write: true
    prompt: |
      Build output: {{outputs.build}}

      Describe what you want the AI to do.
"#;

pub fn template(minimal: bool) -> &'static str {
    if minimal {
        MINIMAL_TEMPLATE
    } else {
        FULL_TEMPLATE
    }
}

/// Write the template into `dir`, refusing to replace a file unless `force`.
pub fn write_template(dir: &Path, minimal: bool, force: bool) -> Result<PathBuf, CliError> {
    let path = dir.join(FILE_NAME);
    if path.exists() && !force {
        return Err(CliError::Command(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    std::fs::write(&path, template(minimal))?;
    Ok(path)
}

#[tracing::instrument(name = "cmd.init", skip_all, fields(minimal = args.minimal))]
pub fn handle_init(args: InitArgs) -> Result<i32, CliError> {
    let cwd = std::env::current_dir()?;
    let path = write_template(&cwd, args.minimal, args.force)?;
    let p = detect_painter(false);

    println!("{} {}", p.green("Created"), path.display());
    println!();
    println!("  {}", p.bold("Next steps:"));
    println!("  1. Edit {FILE_NAME} to define your workflow");
    println!("  2. Run `cortex validate` to check it");
    println!("  3. Run `cortex run` to execute it");
    Ok(0)
}
