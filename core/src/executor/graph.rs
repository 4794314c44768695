use std::collections::{HashMap, VecDeque};

use crate::error::ExecutorError;
use crate::executor::types::TaskLike;

/// Task dependency graph (DAG)
///
/// Built fresh for every plan and never mutated afterwards. `edges` and
/// `reverse_edges` are exact inverses, and the in-degrees sum to the edge count.
#[derive(Debug, Clone)]
pub struct DependencyGraph<T: TaskLike> {
    /// Task nodes: name -> task
    pub nodes: HashMap<String, T>,

    /// Dependency edges: name -> tasks it depends on, in declared order
    pub edges: HashMap<String, Vec<String>>,

    /// Reverse edges: name -> tasks that depend on it
    pub reverse_edges: HashMap<String, Vec<String>>,

    /// Unresolved dependency count per task
    pub in_degree: HashMap<String, usize>,

    /// Node names, sorted
    names: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl<T: TaskLike + Clone> DependencyGraph<T> {
    /// Construct the graph from a name -> task mapping.
    ///
    /// Dependencies are not checked here; validation runs before planning and
    /// `topological_sort` refuses anything that is not a DAG.
    pub fn build<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a T)>,
        T: 'a,
    {
        let mut nodes = HashMap::new();
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut reverse_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut in_degree = HashMap::new();

        for (name, task) in tasks {
            nodes.insert(name.clone(), task.clone());
            edges.entry(name.clone()).or_default();
            reverse_edges.entry(name.clone()).or_default();
            in_degree.insert(name.clone(), 0usize);
        }

        for (name, task) in &nodes {
            for dep in task.dependencies() {
                if let Some(deps) = edges.get_mut(name) {
                    deps.push(dep.clone());
                }
                reverse_edges
                    .entry(dep.clone())
                    .or_default()
                    .push(name.clone());
                if let Some(degree) = in_degree.get_mut(name) {
                    *degree += 1;
                }
            }
        }

        for dependents in reverse_edges.values_mut() {
            dependents.sort();
        }

        let mut names: Vec<String> = nodes.keys().cloned().collect();
        names.sort();

        Self {
            nodes,
            edges,
            reverse_edges,
            in_degree,
            names,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node names in lexicographic order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Tasks with no dependencies, sorted.
    pub fn roots(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| self.in_degree.get(*n).copied().unwrap_or(0) == 0)
            .cloned()
            .collect()
    }

    pub fn dependencies(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, name: &str) -> &[String] {
        self.reverse_edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Returns a total order in which every task follows all of its dependencies.
    ///
    /// # Algorithm
    ///
    /// 1. Seed a queue with every in-degree 0 task, sorted by name
    /// 2. Pop the front, append it to the order, decrement its dependents
    /// 3. Dependents that reach 0 form a batch, sorted before joining the queue
    /// 4. Fewer ordered tasks than nodes means a cycle
    ///
    /// # Time Complexity
    ///
    /// O(V log V + E) where V = number of tasks, E = number of dependencies
    pub fn topological_sort(&self) -> Result<Vec<String>, ExecutorError> {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<String> = self.roots().into();
        let mut order = Vec::with_capacity(self.len());

        while let Some(name) = queue.pop_front() {
            let mut ready = Vec::new();
            for dependent in self.dependents(&name) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.push(dependent.clone());
                    }
                }
            }
            ready.sort();
            queue.extend(ready);
            order.push(name);
        }

        if order.len() != self.len() {
            return Err(ExecutorError::CycleDetected {
                processed: order.len(),
                total: self.len(),
            });
        }

        Ok(order)
    }

    /// Detect circular dependencies with a three-colour DFS.
    ///
    /// Returns the cycle as a path that starts and ends with the same task,
    /// e.g. `[a, b, a]`. Roots are tried in name order and dependencies in
    /// declared order, so the reported path is stable.
    ///
    /// # Time Complexity
    ///
    /// O(V + E) where V = number of tasks, E = number of dependencies
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();

        for name in &self.names {
            if state.contains_key(name.as_str()) {
                continue;
            }
            if let Some(cycle) = self.visit(name, &mut state, &mut path) {
                return Some(cycle);
            }
        }

        None
    }

    fn visit<'g>(
        &'g self,
        node: &'g str,
        state: &mut HashMap<&'g str, Visit>,
        path: &mut Vec<&'g str>,
    ) -> Option<Vec<String>> {
        match state.get(node) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                let start = path.iter().position(|p| *p == node).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(node.to_string());
                return Some(cycle);
            }
            None => {}
        }

        state.insert(node, Visit::InProgress);
        path.push(node);

        for dep in self.dependencies(node) {
            if let Some(cycle) = self.visit(dep, state, path) {
                return Some(cycle);
            }
        }

        path.pop();
        state.insert(node, Visit::Done);
        None
    }
}
