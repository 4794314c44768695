use std::path::PathBuf;

use crate::config::RunSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One task at a time in topological order; stop at the first failure.
    Sequential,
    /// Level by level with a bounded worker pool; stop after a failed level.
    Parallel,
}

/// Execution options for one run.
#[derive(Debug, Clone)]
pub struct ExecutionOpts {
    pub mode: ExecutionMode,

    /// Concurrent task cap within a level; `None` or 0 means one per CPU.
    pub max_parallel: Option<usize>,

    /// Working directory handed to every agent task.
    pub workdir: Option<PathBuf>,
}

impl Default for ExecutionOpts {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            max_parallel: None,
            workdir: None,
        }
    }
}

impl ExecutionOpts {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            mode: if settings.parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            },
            max_parallel: Some(settings.max_parallel),
            workdir: None,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Worker count for a level of `level_size` tasks: `min(max_parallel, level_size)`,
    /// with CPU count standing in for an unset limit. Never below 1.
    pub fn concurrency_for(&self, level_size: usize) -> usize {
        let cap = match self.max_parallel {
            Some(n) if n > 0 => n,
            _ => num_cpus::get(),
        };
        cap.min(level_size).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_bounded_by_level_size() {
        let opts = ExecutionOpts {
            max_parallel: Some(4),
            ..Default::default()
        };
        assert_eq!(opts.concurrency_for(2), 2);
        assert_eq!(opts.concurrency_for(10), 4);
        assert_eq!(opts.concurrency_for(0), 1);
    }

    #[test]
    fn unset_limit_uses_cpus() {
        let opts = ExecutionOpts {
            max_parallel: Some(0),
            ..Default::default()
        };
        assert_eq!(opts.concurrency_for(10_000), num_cpus::get().min(10_000));
    }
}
