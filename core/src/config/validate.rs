use std::collections::BTreeSet;

use super::tool::Tool;
use super::workflow::WorkflowConfig;
use crate::error::{ValidationError, ValidationErrors};
use crate::executor::{extract_template_vars, DependencyGraph};

/// Check a workflow for every problem that would stop it from planning.
///
/// Problems are collected rather than returned one at a time. Agents and tasks
/// are visited in name order so reports are stable between runs.
pub fn validate(config: &WorkflowConfig, file: &str) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::default();

    if config.agents.is_empty() {
        errs.push(
            ValidationError::new(file, "no agents defined")
                .with_hint("Add an 'agents:' section with at least one agent"),
        );
    }
    if config.tasks.is_empty() {
        errs.push(
            ValidationError::new(file, "no tasks defined")
                .with_hint("Add a 'tasks:' section with at least one task"),
        );
    }

    let available_agents = config.agents.keys().cloned().collect::<Vec<_>>().join(", ");
    let available_tasks = config.tasks.keys().cloned().collect::<Vec<_>>().join(", ");

    for (name, agent) in &config.agents {
        if agent.tool.trim().is_empty() {
            errs.push(
                ValidationError::new(file, format!("agent \"{name}\": tool is required"))
                    .with_hint(format!("Add 'tool: <tool>' (supported: {})", Tool::supported_list())),
            );
        } else if agent.tool.parse::<Tool>().is_err() {
            errs.push(
                ValidationError::new(
                    file,
                    format!("agent \"{name}\" uses unsupported tool \"{}\"", agent.tool),
                )
                .with_hint(format!("Supported tools: {}", Tool::supported_list())),
            );
        }
    }

    for (name, task) in &config.tasks {
        let tool = if task.agent.trim().is_empty() {
            errs.push(
                ValidationError::new(file, format!("task \"{name}\": agent is required"))
                    .with_hint("Add 'agent: <agent_name>' to specify which agent runs this task"),
            );
            None
        } else if let Some(agent) = config.agents.get(&task.agent) {
            agent.tool.parse::<Tool>().ok()
        } else {
            errs.push(
                ValidationError::new(
                    file,
                    format!(
                        "task \"{name}\" references undefined agent \"{}\"",
                        task.agent
                    ),
                )
                .with_hint(if available_agents.is_empty() {
                    String::new()
                } else {
                    format!("Available agents: {available_agents}")
                }),
            );
            None
        };

        check_prompt_source(&mut errs, file, name, task, tool);

        let mut seen = BTreeSet::new();
        for dep in &task.needs {
            if dep == name {
                errs.push(
                    ValidationError::new(file, format!("task \"{name}\" cannot depend on itself"))
                        .with_hint("Remove the self-reference from the 'needs' list"),
                );
            } else if !config.tasks.contains_key(dep) {
                errs.push(
                    ValidationError::new(
                        file,
                        format!("task \"{name}\" depends on undefined task \"{dep}\""),
                    )
                    .with_hint(format!("Available tasks: {available_tasks}")),
                );
            }
            if !seen.insert(dep.as_str()) {
                errs.push(
                    ValidationError::new(
                        file,
                        format!("task \"{name}\" lists dependency \"{dep}\" more than once"),
                    )
                    .with_hint("Remove the duplicate entry from 'needs'"),
                );
            }
        }

        if let Some(prompt) = task.prompt_text() {
            for referenced in extract_template_vars(prompt) {
                if !config.tasks.contains_key(&referenced) {
                    errs.push(
                        ValidationError::new(
                            file,
                            format!(
                                "task \"{name}\": template references undefined task \"{referenced}\""
                            ),
                        )
                        .with_hint("Define the task or fix the template variable name"),
                    );
                } else if !task.needs.contains(&referenced) {
                    errs.push(
                        ValidationError::new(
                            file,
                            format!(
                                "task \"{name}\": template references \"{referenced}\" which is not in 'needs'"
                            ),
                        )
                        .with_hint(format!(
                            "Add '{referenced}' to the 'needs' list to ensure it runs first"
                        )),
                    );
                }
            }
        }
    }

    if let Some(cycle) = DependencyGraph::build(&config.tasks).detect_cycle() {
        errs.push(
            ValidationError::new(
                file,
                format!("circular dependency detected: {}", cycle.join(" -> ")),
            )
            .with_hint("Remove one of the dependencies to break the cycle"),
        );
    }

    errs.into_result()
}

fn check_prompt_source(
    errs: &mut ValidationErrors,
    file: &str,
    name: &str,
    task: &super::TaskConfig,
    tool: Option<Tool>,
) {
    let (prompt, prompt_file, command) =
        (task.has_prompt(), task.has_prompt_file(), task.has_command());

    if tool == Some(Tool::Shell) {
        if !command {
            errs.push(
                ValidationError::new(
                    file,
                    format!("task \"{name}\": shell agent requires 'command' field"),
                )
                .with_hint("Add 'command: <shell_command>' to specify the command to run"),
            );
        }
        if prompt || prompt_file {
            errs.push(
                ValidationError::new(
                    file,
                    format!(
                        "task \"{name}\": shell agent should use 'command', not 'prompt' or 'prompt_file'"
                    ),
                )
                .with_hint("Replace 'prompt' or 'prompt_file' with 'command: <shell_command>'"),
            );
        }
        return;
    }

    if !prompt && !prompt_file {
        errs.push(
            ValidationError::new(file, format!("task \"{name}\" has no prompt defined"))
                .with_hint("Add either 'prompt:' with inline text or 'prompt_file:' with a file path"),
        );
    }
    if prompt && prompt_file {
        errs.push(
            ValidationError::new(
                file,
                format!("task \"{name}\": cannot have both 'prompt' and 'prompt_file'"),
            )
            .with_hint("Use either inline 'prompt:' or external 'prompt_file:', not both"),
        );
    }
    if command {
        errs.push(
            ValidationError::new(
                file,
                format!("task \"{name}\": 'command' field is only for shell agents"),
            )
            .with_hint("Use 'prompt' or 'prompt_file' for AI agents, or change agent tool to 'shell'"),
        );
    }
}
