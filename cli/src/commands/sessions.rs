//! `cortex sessions`: browse the session store.
use cortex_core::api as core_api;
use cortex_core::api::{CliError, RunResult, SessionFilter, SessionInfo};

use crate::commands::cli::SessionsArgs;
use crate::output::{detect_painter, Painter};

const PREVIEW_LINES: usize = 5;

#[tracing::instrument(name = "cmd.sessions", skip_all)]
pub fn handle_sessions(args: SessionsArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let root = core_api::sessions_root(cfg)?;
    let p = detect_painter(false);

    if let Some(run_id) = &args.show {
        let project = match &args.project {
            Some(project) => project.clone(),
            None => core_api::project_name(&std::env::current_dir()?),
        };
        let run = core_api::get_session(&root, &project, run_id)?;
        print!("{}", format_run(&run, &p));
        return Ok(0);
    }

    let filter = SessionFilter {
        project: args.project.clone(),
        limit: args.limit,
        failed_only: args.failed,
    };
    let sessions = core_api::list_sessions(&root, &filter)?;
    if sessions.is_empty() {
        println!("{}", p.dim("No sessions found."));
        if args.project.is_some() {
            println!("{}", p.dim("Try without --project."));
        }
        return Ok(0);
    }

    println!("{} ({}):\n", p.bold("Sessions"), sessions.len());
    for s in &sessions {
        print!("{}", format_session(s, &p));
    }
    Ok(0)
}

fn format_session(s: &SessionInfo, p: &Painter) -> String {
    let started = s
        .start_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let duration = if s.duration_ms > 0 {
        format!(" ({})", core_api::format_duration(s.duration_ms))
    } else {
        String::new()
    };
    format!(
        "  {} {} {}\n      {} {}  {} {}{}\n",
        p.status(s.success),
        p.bold(&s.run_id),
        p.dim(&started),
        p.dim("Project:"),
        s.project,
        p.dim("Tasks:"),
        s.task_count,
        duration
    )
}

fn format_run(run: &RunResult, p: &Painter) -> String {
    let mut out = format!(
        "{} {} {} ({})\n\n",
        p.bold("Run"),
        run.run_id,
        p.status(run.success),
        core_api::format_precise(run.duration_ms())
    );
    for task in &run.tasks {
        out.push_str(&format!(
            "  {} {} {}\n",
            p.status(task.success),
            task.task_name,
            p.dim(&format!(
                "({} -> {}, exit {}, {})",
                task.agent, task.tool, task.exit_code, task.duration
            ))
        ));
        let lines: Vec<&str> = task.stdout.trim_end().lines().collect();
        for line in lines.iter().take(PREVIEW_LINES) {
            out.push_str(&format!("    | {line}\n"));
        }
        if lines.len() > PREVIEW_LINES {
            out.push_str(&format!(
                "    | {}\n",
                p.dim(&format!("... ({} more lines)", lines.len() - PREVIEW_LINES))
            ));
        }
        if !task.success {
            if let Some(line) = task.stderr.lines().find(|l| !l.trim().is_empty()) {
                out.push_str(&format!("    {}\n", p.red(line.trim())));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn session_line_shows_duration_only_when_known() {
        let p = Painter::new(false);
        let mut s = SessionInfo {
            run_id: "20240101-120000".into(),
            project: "demo".into(),
            start_time: None,
            end_time: None,
            success: false,
            task_count: 2,
            duration_ms: 0,
            run_dir: PathBuf::from("/tmp/x"),
        };
        let line = format_session(&s, &p);
        assert!(line.contains("FAILED 20240101-120000 unknown"));
        assert!(!line.contains('('));

        s.duration_ms = 65_000;
        assert!(format_session(&s, &p).contains("(1m5s)"));
    }

    #[test]
    fn run_view_lists_tasks() {
        let p = Painter::new(false);
        let mut run = RunResult::new("r1");
        let task = core_api::AgentTask {
            name: "build".into(),
            agent: "sh".into(),
            tool: core_api::Tool::Shell,
            model: None,
            prompt: "make".into(),
            write: false,
            workdir: None,
        };
        run.tasks.push(
            core_api::TaskResult::start(&task).complete(core_api::AgentOutput::from_exit(
                "compiled\n".into(),
                "warning: x\n".into(),
                2,
            )),
        );
        let text = format_run(&run, &p);
        assert!(text.contains("FAILED build (sh -> shell, exit 2"));
        assert!(text.contains("| compiled"));
        assert!(text.contains("warning: x"));
    }
}
