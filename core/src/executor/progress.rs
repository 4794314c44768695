use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::traits::{ExecutionObserver, RunEvent};

/// Visual progress monitor for task execution
///
/// Shows an overall bar plus one spinner per running task. Bars are created
/// when the run starts, since that is when the task count is known.
pub struct ProgressMonitor {
    enabled: bool,
    bars: Mutex<Option<Bars>>,
}

struct Bars {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: HashMap<String, ProgressBar>,
    total_levels: usize,
}

impl ProgressMonitor {
    /// Create a new progress monitor
    ///
    /// * `enabled` - Whether to draw anything (disabled off-terminal and for jsonl output)
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bars: Mutex::new(None),
        }
    }

    fn with_bars(&self, f: impl FnOnce(&mut Bars)) {
        if !self.enabled {
            return;
        }
        let mut guard = match self.bars.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(bars) = guard.as_mut() {
            f(bars);
        }
    }

    fn start(&self, total_tasks: usize, total_levels: usize) {
        if !self.enabled {
            return;
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        overall.set_message("Starting...");

        let mut guard = match self.bars.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Bars {
            multi,
            overall,
            task_bars: HashMap::new(),
            total_levels,
        });
    }
}

impl Bars {
    fn add_task(&mut self, task: &str) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(format!("⏳ {task}"));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.task_bars.insert(task.to_string(), bar);
    }

    fn complete_task(&mut self, task: &str, success: bool, duration: &str) {
        if let Some(bar) = self.task_bars.remove(task) {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{icon} {task} ({duration})"));
        }
        self.overall.inc(1);
    }

    fn finish(&mut self, success: bool) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
        let msg = if success {
            "✅ All tasks completed"
        } else {
            "❌ Execution failed"
        };
        self.overall.finish_with_message(msg);
    }
}

impl ExecutionObserver for ProgressMonitor {
    fn name(&self) -> &str {
        "progress"
    }

    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStart {
                total_tasks,
                total_levels,
                ..
            } => self.start(*total_tasks, *total_levels),
            RunEvent::LevelStart { index, .. } => self.with_bars(|b| {
                b.overall
                    .set_message(format!("Level {}/{}", index + 1, b.total_levels));
            }),
            RunEvent::TaskStart { task, .. } => self.with_bars(|b| b.add_task(task)),
            RunEvent::TaskComplete { result, .. } => self.with_bars(|b| {
                b.complete_task(&result.task_name, result.success, &result.duration)
            }),
            RunEvent::LevelEnd { .. } => {}
            RunEvent::RunEnd { result, .. } => self.with_bars(|b| b.finish(result.success)),
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        // Ensure all spinners are cleaned up
        if let Ok(mut guard) = self.bars.lock() {
            if let Some(bars) = guard.as_mut() {
                for (_, bar) in bars.task_bars.drain() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}
