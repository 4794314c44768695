use std::collections::HashMap;

use serde::Serialize;

use crate::executor::graph::DependencyGraph;
use crate::executor::types::TaskLike;

/// Tasks that may run concurrently: all their dependencies live in earlier levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionLevel {
    pub index: usize,
    /// Sorted by name.
    pub tasks: Vec<String>,
}

impl ExecutionLevel {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Group tasks into dependency levels by repeatedly peeling off in-degree 0 tasks.
///
/// On a cycle the peeling stalls and only the levels found so far are
/// returned; compare `total_tasks` with the graph size to detect that.
pub fn build_levels<T: TaskLike>(graph: &DependencyGraph<T>) -> Vec<ExecutionLevel> {
    let mut remaining: HashMap<&str, usize> = graph
        .names()
        .iter()
        .map(|n| (n.as_str(), graph.in_degree.get(n).copied().unwrap_or(0)))
        .collect();
    let mut levels = Vec::new();

    while !remaining.is_empty() {
        let mut ready: Vec<String> = remaining
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| name.to_string())
            .collect();

        if ready.is_empty() {
            tracing::warn!(
                unassigned = remaining.len(),
                "dependency cycle prevents level assignment"
            );
            break;
        }
        ready.sort();

        for name in &ready {
            remaining.remove(name.as_str());
        }
        for name in &ready {
            for dependent in graph.dependents(name) {
                if let Some(degree) = remaining.get_mut(dependent.as_str()) {
                    *degree = degree.saturating_sub(1);
                }
            }
        }

        levels.push(ExecutionLevel {
            index: levels.len(),
            tasks: ready,
        });
    }

    levels
}

pub fn total_tasks(levels: &[ExecutionLevel]) -> usize {
    levels.iter().map(ExecutionLevel::len).sum()
}

/// Size of the widest level.
pub fn max_parallelism(levels: &[ExecutionLevel]) -> usize {
    levels.iter().map(ExecutionLevel::len).max().unwrap_or(0)
}

pub fn level_of(levels: &[ExecutionLevel], task: &str) -> Option<usize> {
    levels
        .iter()
        .find(|l| l.tasks.iter().any(|t| t == task))
        .map(|l| l.index)
}
