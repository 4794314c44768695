//! `cortex validate`: check a workflow and print its plan.
use std::path::Path;

use cortex_core::api as core_api;
use cortex_core::api::{CliError, ErrorCode, WorkflowConfig};
use cortex_plugins::factory::build_registry;

use crate::commands::cli::ValidateArgs;
use crate::output::detect_painter;

/// Load a workflow, fill agent defaults from the global config, and validate it.
pub fn load_checked(path: &Path, cfg: &core_api::AppConfig) -> Result<WorkflowConfig, CliError> {
    let mut workflow = core_api::load_workflow(path)?;
    cfg.apply_defaults(&mut workflow);
    core_api::validate(&workflow, &path.display().to_string())?;
    Ok(workflow)
}

#[tracing::instrument(name = "cmd.validate", skip_all, fields(check_tools = args.check_tools))]
pub async fn handle_validate(
    args: ValidateArgs,
    cfg: &core_api::AppConfig,
) -> Result<i32, CliError> {
    let cwd = std::env::current_dir()?;
    let patterns: Vec<String> = args.file.into_iter().collect();
    let files = core_api::resolve_workflow_files(&patterns, &cwd)?;
    let p = detect_painter(false);

    let mut exit = ErrorCode::Success.exit_code();
    for path in files {
        let workflow = load_checked(&path, cfg)?;
        let plan = core_api::build_plan(&workflow)?;
        let levels = core_api::build_levels(&plan.graph);

        println!("{} {}", p.green("Configuration is valid:"), path.display());
        println!("  {} {}", p.dim("Agents:"), workflow.agents.len());
        println!("  {} {}", p.dim("Tasks:"), workflow.tasks.len());
        println!("  {} {}", p.dim("Execution levels:"), levels.len());
        println!(
            "  {} {}",
            p.dim("Max parallelism:"),
            core_api::max_parallelism(&levels)
        );
        println!();
        print!("{plan}");
        for level in &levels {
            println!("  level {}: {}", level.index + 1, level.tasks.join(", "));
        }

        if args.check_tools {
            println!();
            let registry = build_registry(false);
            for tool in plan.tools() {
                let result = match registry.get(tool) {
                    Some(agent) => agent.check().await,
                    None => Err(core_api::AgentError::Unavailable {
                        program: tool.to_string(),
                        reason: "no adapter".to_string(),
                    }),
                };
                match result {
                    Ok(()) => println!("  {} {tool}", p.green("available")),
                    Err(e) => {
                        println!("  {} {tool}: {e}", p.red("missing"));
                        exit = e.error_code().exit_code();
                    }
                }
            }
        }
        println!();
    }
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_checked_applies_defaults_and_reports_errors() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.yml");
        std::fs::write(
            &good,
            "agents:\n  dev: {}\ntasks:\n  a:\n    agent: dev\n    prompt: hi\n",
        )
        .unwrap();
        let bad = dir.path().join("bad.yml");
        std::fs::write(
            &bad,
            "agents:\n  dev:\n    tool: claude-code\ntasks:\n  a:\n    agent: ghost\n    prompt: hi\n",
        )
        .unwrap();

        let mut cfg = core_api::AppConfig::default();
        cfg.defaults.tool = Some("claude-code".into());
        let workflow = load_checked(&good, &cfg).unwrap();
        assert_eq!(workflow.agents["dev"].tool, "claude-code");

        let err = load_checked(&bad, &cfg).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
    }
}
