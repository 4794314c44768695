use std::fmt;

use crate::config::{TaskConfig, Tool, WorkflowConfig};
use crate::error::ExecutorError;
use crate::executor::graph::DependencyGraph;
use crate::executor::levels::{build_levels, ExecutionLevel};
use crate::executor::types::TaskLike;

/// A task with its agent resolved, ready to hand to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTask {
    pub name: String,
    pub agent_name: String,
    pub tool: Tool,
    pub model: Option<String>,
    /// Prompt before template expansion.
    pub prompt: String,
    pub write: bool,
    pub dependencies: Vec<String>,
}

impl TaskLike for ExecutionTask {
    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Tasks in topological order plus the graph they were sorted from.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub tasks: Vec<ExecutionTask>,
    pub graph: DependencyGraph<TaskConfig>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, name: &str) -> Option<&ExecutionTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn levels(&self) -> Vec<ExecutionLevel> {
        build_levels(&self.graph)
    }

    /// Tools used by at least one task, sorted.
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tasks.iter().map(|t| t.tool).collect();
        tools.sort();
        tools.dedup();
        tools
    }
}

/// Resolve a validated workflow into an execution plan.
///
/// Only fails if the workflow slipped past validation: a cycle, an unknown
/// agent or tool, or a task with no prompt.
pub fn build_plan(config: &WorkflowConfig) -> Result<ExecutionPlan, ExecutorError> {
    let graph = DependencyGraph::build(&config.tasks);
    let order = graph.topological_sort()?;

    let mut tasks = Vec::with_capacity(order.len());
    for name in order {
        let Some(task) = config.tasks.get(&name) else {
            continue;
        };
        let agent = config
            .agents
            .get(&task.agent)
            .ok_or_else(|| ExecutorError::UnknownAgent {
                task: name.clone(),
                agent: task.agent.clone(),
            })?;
        let tool = agent
            .tool
            .parse::<Tool>()
            .map_err(ExecutorError::UnsupportedTool)?;
        let prompt = task
            .prompt_text()
            .ok_or_else(|| ExecutorError::MissingPrompt(name.clone()))?
            .to_string();

        tasks.push(ExecutionTask {
            agent_name: task.agent.clone(),
            tool,
            model: agent.model.clone().filter(|m| !m.trim().is_empty()),
            prompt,
            write: task.write,
            dependencies: task.needs.clone(),
            name,
        });
    }

    tracing::debug!(tasks = tasks.len(), "execution plan built");
    Ok(ExecutionPlan { tasks, graph })
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution Plan ({} tasks):", self.tasks.len())?;
        for (i, task) in self.tasks.iter().enumerate() {
            write!(f, "  {}. {} ({} -> {}", i + 1, task.name, task.agent_name, task.tool)?;
            if let Some(model) = &task.model {
                write!(f, "/{model}")?;
            }
            f.write_str(")")?;
            if !task.dependencies.is_empty() {
                write!(f, " [depends: {}]", task.dependencies.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_workflow;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const FLOW: &str = r#"
agents:
  architect: { tool: claude-code, model: opus }
  runner: { tool: shell }
tasks:
  design:
    agent: architect
    prompt: Design the API
    write: true
  scaffold:
    agent: runner
    command: "mkdir -p src"
  implement:
    agent: architect
    prompt: "Implement {{outputs.design}}"
    needs: [design, scaffold]
"#;

    #[test]
    fn plan_is_topological_with_resolved_agents() {
        let cfg = parse_workflow(FLOW, Path::new("Cortexfile.yml")).unwrap();
        let plan = build_plan(&cfg).unwrap();
        let names: Vec<&str> = plan.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["design", "scaffold", "implement"]);

        let design = plan.task("design").unwrap();
        assert_eq!(design.tool, Tool::ClaudeCode);
        assert_eq!(design.model.as_deref(), Some("opus"));
        assert!(design.write);

        let scaffold = plan.task("scaffold").unwrap();
        assert_eq!(scaffold.prompt, "mkdir -p src");
        assert_eq!(scaffold.model, None);

        assert_eq!(plan.tools(), vec![Tool::ClaudeCode, Tool::Shell]);
        assert_eq!(plan.levels().len(), 2);
    }

    #[test]
    fn display_lists_tasks_with_dependencies() {
        let cfg = parse_workflow(FLOW, Path::new("Cortexfile.yml")).unwrap();
        let plan = build_plan(&cfg).unwrap();
        assert_eq!(
            plan.to_string(),
            "Execution Plan (3 tasks):\n\
             \x20 1. design (architect -> claude-code/opus)\n\
             \x20 2. scaffold (runner -> shell)\n\
             \x20 3. implement (architect -> claude-code/opus) [depends: design, scaffold]\n"
        );
    }

    #[test]
    fn cycle_is_a_planning_error() {
        let cfg = parse_workflow(
            "agents:\n  a: { tool: shell }\ntasks:\n  x: { agent: a, command: x, needs: y }\n  y: { agent: a, command: y, needs: x }\n",
            Path::new("f"),
        )
        .unwrap();
        assert!(matches!(
            build_plan(&cfg),
            Err(ExecutorError::CycleDetected { processed: 0, total: 2 })
        ));
    }

    #[test]
    fn unknown_agent_is_a_planning_error() {
        let cfg = parse_workflow(
            "agents: {}\ntasks:\n  x: { agent: ghost, prompt: hi }\n",
            Path::new("f"),
        )
        .unwrap();
        assert!(matches!(
            build_plan(&cfg),
            Err(ExecutorError::UnknownAgent { .. })
        ));
    }
}
