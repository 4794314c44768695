use cortex_core::api::{format_precise, ExecutionObserver, RunEvent, TaskResult};

use super::Painter;

const PREVIEW_LINES: usize = 5;

/// Human-readable run log on stdout.
pub struct TextRenderer {
    painter: Painter,
    verbose: bool,
}

impl TextRenderer {
    pub fn new(painter: Painter, verbose: bool) -> Self {
        Self { painter, verbose }
    }

    fn format_event(&self, event: &RunEvent) -> Option<String> {
        match event {
            RunEvent::RunStart {
                run_id,
                total_tasks,
                total_levels,
            } => Some(format!(
                "{} {} tasks in {} levels {}",
                self.painter.bold("Running"),
                total_tasks,
                total_levels,
                self.painter.dim(&format!("(run {run_id})"))
            )),
            RunEvent::LevelStart { index, tasks, .. } => Some(
                self.painter
                    .cyan(&format!("Level {}: {}", index + 1, tasks.join(", "))),
            ),
            RunEvent::TaskStart {
                task,
                agent,
                tool,
                model,
                ..
            } => {
                let target = match model {
                    Some(m) => format!("{agent} -> {tool}/{m}"),
                    None => format!("{agent} -> {tool}"),
                };
                Some(format!("  > {task} {}", self.painter.dim(&format!("({target})"))))
            }
            RunEvent::TaskComplete { result, .. } => Some(self.format_task(result)),
            RunEvent::LevelEnd { index, failed, .. } if !failed.is_empty() => Some(
                self.painter
                    .red(&format!("Level {} failed: {}", index + 1, failed.join(", "))),
            ),
            RunEvent::LevelEnd { .. } => None,
            RunEvent::RunEnd { result, .. } => {
                let duration = format_precise(result.duration_ms());
                let failed = result.failed_tasks().count();
                Some(if result.success {
                    self.painter.green(&format!(
                        "Completed {} tasks in {duration}",
                        result.tasks.len()
                    ))
                } else {
                    self.painter.red(&format!(
                        "Run failed: {failed} of {} tasks failed ({duration})",
                        result.tasks.len()
                    ))
                })
            }
        }
    }

    fn format_task(&self, result: &TaskResult) -> String {
        let mut out = if result.success {
            format!(
                "  {} {} {}",
                self.painter.green("ok"),
                result.task_name,
                self.painter.dim(&format!("({})", result.duration))
            )
        } else {
            format!(
                "  {} {} {}",
                self.painter.red("FAILED"),
                result.task_name,
                self.painter
                    .dim(&format!("(exit {}, {})", result.exit_code, result.duration))
            )
        };

        if !result.success {
            if let Some(line) = result.stderr.lines().find(|l| !l.trim().is_empty()) {
                out.push_str(&format!("\n      {}", line.trim()));
            }
        }

        if self.verbose && !result.stdout.trim().is_empty() {
            let lines: Vec<&str> = result.stdout.trim_end().lines().collect();
            for line in lines.iter().take(PREVIEW_LINES) {
                out.push_str(&format!("\n    | {line}"));
            }
            if lines.len() > PREVIEW_LINES {
                out.push_str(&format!(
                    "\n    | {}",
                    self.painter.dim(&format!("... ({} more lines)", lines.len() - PREVIEW_LINES))
                ));
            }
        }
        out
    }
}

impl ExecutionObserver for TextRenderer {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn on_event(&self, event: &RunEvent) {
        if let Some(line) = self.format_event(event) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::api::{AgentOutput, AgentTask, Tool};

    fn result(stdout: &str, code: i32) -> TaskResult {
        let task = AgentTask {
            name: "lint".into(),
            agent: "sh".into(),
            tool: Tool::Shell,
            model: None,
            prompt: "make lint".into(),
            write: false,
            workdir: None,
        };
        TaskResult::start(&task).complete(AgentOutput::from_exit(
            stdout.into(),
            "boom\nmore".into(),
            code,
        ))
    }

    #[test]
    fn failed_task_shows_exit_and_first_stderr_line() {
        let renderer = TextRenderer::new(Painter::new(false), false);
        let line = renderer.format_task(&result("", 2));
        assert!(line.contains("FAILED lint"));
        assert!(line.contains("exit 2"));
        assert!(line.contains("boom"));
        assert!(!line.contains("more"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn verbose_preview_is_limited() {
        let renderer = TextRenderer::new(Painter::new(false), true);
        let stdout = (1..=8).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let out = renderer.format_task(&result(&stdout, 0));
        assert!(out.contains("line5"));
        assert!(!out.contains("line6"));
        assert!(out.contains("(3 more lines)"));
    }

    #[test]
    fn color_is_opt_in() {
        let plain = TextRenderer::new(Painter::new(false), false);
        let colored = TextRenderer::new(Painter::new(true), false);
        let ok = result("", 0);
        assert!(!plain.format_task(&ok).contains('\x1b'));
        assert!(colored.format_task(&ok).contains("\x1b[32m"));
    }

    #[test]
    fn successful_level_end_is_silent() {
        let renderer = TextRenderer::new(Painter::new(false), false);
        let event = RunEvent::LevelEnd {
            run_id: "r".into(),
            index: 0,
            failed: vec![],
        };
        assert!(renderer.format_event(&event).is_none());
    }
}
