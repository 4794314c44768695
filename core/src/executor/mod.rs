//! Dependency-aware execution of workflow plans
//!
//! This module turns a validated workflow into a plan and runs it:
//! - Dependency graph construction and three-colour cycle detection
//! - Deterministic topological sorting (Kahn, ties broken by name)
//! - Level grouping for safe intra-level parallelism
//! - `{{outputs.<task>}}` template expansion between tasks
//! - Sequential or level-by-level parallel execution with a bounded worker pool
//!
//! # Architecture
//!
//! ```text
//! WorkflowConfig
//!   ↓
//! DependencyGraph::build() → { nodes, edges, reverse_edges, in_degree }
//!   ↓
//! build_plan() → topological_sort() → ExecutionPlan { tasks, graph }
//!   ↓
//! Executor::execute()
//!   ├─ Sequential: tasks in order, stop at first failure
//!   └─ Parallel:   build_levels() → per level: Semaphore-bounded workers → barrier
//!   ↓
//! per task: expand_prompt() → Agent::run() → ResultSink + ExecutionObserver
//!   ↓
//! RunOutcome { RunResult, error }
//! ```

mod engine;
mod graph;
mod levels;
mod plan;
mod progress;
mod scheduler;
mod template;
pub mod traits;
pub mod types;

pub use engine::{Executor, ExecutorBuilder, RunOutcome};
pub use graph::DependencyGraph;
pub use levels::{build_levels, level_of, max_parallelism, total_tasks, ExecutionLevel};
pub use plan::{build_plan, ExecutionPlan, ExecutionTask};
pub use progress::ProgressMonitor;
pub use scheduler::execute_level_parallel;
pub use template::{expand_prompt, extract_template_vars, missing_outputs};
pub use traits::{Agent, AgentRegistry, ExecutionObserver, NoopSink, ResultSink, RunEvent};
pub use types::{
    generate_run_id, AgentOutput, AgentTask, ExecutionMode, ExecutionOpts, RunResult, RunStatus,
    TaskLike, TaskResult,
};
