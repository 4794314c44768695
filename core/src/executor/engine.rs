use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio_util::sync::CancellationToken;

use crate::error::ExecutorError;

use super::levels::{build_levels, total_tasks};
use super::plan::{ExecutionPlan, ExecutionTask};
use super::scheduler::execute_level_parallel;
use super::template::{expand_prompt, missing_outputs};
use super::traits::{AgentRegistry, ExecutionObserver, NoopSink, ResultSink, RunEvent};
use super::types::{
    generate_run_id, AgentTask, ExecutionMode, ExecutionOpts, RunResult, RunStatus, TaskResult,
};

/// Result of a run that got as far as starting.
///
/// `result` is always complete and already handed to the sink; `error` is the
/// failure that halted scheduling, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub result: RunResult,
    pub error: Option<ExecutorError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.result.success
    }

    pub fn into_result(self) -> Result<RunResult, ExecutorError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.result),
        }
    }
}

/// Runs execution plans against a set of agents.
///
/// Cheap to clone; all clones share the registry, sink and observers.
#[derive(Clone)]
pub struct Executor {
    inner: Arc<Inner>,
}

struct Inner {
    registry: AgentRegistry,
    sink: Arc<dyn ResultSink>,
    observers: Vec<Arc<dyn ExecutionObserver>>,
    opts: ExecutionOpts,
}

pub struct ExecutorBuilder {
    registry: AgentRegistry,
    sink: Arc<dyn ResultSink>,
    observers: Vec<Arc<dyn ExecutionObserver>>,
    opts: ExecutionOpts,
}

impl ExecutorBuilder {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            sink: Arc::new(NoopSink),
            observers: Vec::new(),
            opts: ExecutionOpts::default(),
        }
    }

    pub fn sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn observers(mut self, observers: Vec<Arc<dyn ExecutionObserver>>) -> Self {
        self.observers.extend(observers);
        self
    }

    pub fn opts(mut self, opts: ExecutionOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn build(self) -> Executor {
        Executor {
            inner: Arc::new(Inner {
                registry: self.registry,
                sink: self.sink,
                observers: self.observers,
                opts: self.opts,
            }),
        }
    }
}

/// State shared by every worker of one run.
struct RunState {
    run_id: String,
    /// Captured stdout per finished task, read by template expansion.
    outputs: RwLock<HashMap<String, String>>,
    /// Append-only while the run is in flight.
    run: Mutex<RunResult>,
}

impl RunState {
    fn new(run_id: String) -> Self {
        Self {
            outputs: RwLock::new(HashMap::new()),
            run: Mutex::new(RunResult::new(run_id.clone())),
            run_id,
        }
    }

    fn run(&self) -> MutexGuard<'_, RunResult> {
        match self.run.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn has_result(&self, task: &str) -> bool {
        self.run().tasks.iter().any(|t| t.task_name == task)
    }

    fn expand(&self, prompt: &str) -> String {
        let outputs = match self.outputs.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let missing = missing_outputs(prompt, &outputs);
        if !missing.is_empty() {
            tracing::debug!(missing = ?missing, "placeholders left unexpanded");
        }
        expand_prompt(prompt, &outputs).into_owned()
    }

    fn set_output(&self, task: &str, output: &str) {
        let mut outputs = match self.outputs.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        outputs.insert(task.to_string(), output.to_string());
    }
}

impl Executor {
    pub fn builder(registry: AgentRegistry) -> ExecutorBuilder {
        ExecutorBuilder::new(registry)
    }

    pub fn opts(&self) -> &ExecutionOpts {
        &self.inner.opts
    }

    /// Execute `plan` under a freshly generated run id.
    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, ExecutorError> {
        self.execute_as(plan, generate_run_id(), cancel).await
    }

    /// Execute `plan`, recording results under `run_id`.
    ///
    /// `Err` means nothing ran: the plan's levels do not cover every task.
    /// Task failures come back as `Ok` with `RunOutcome::error` set.
    #[tracing::instrument(name = "executor.run", skip_all, fields(run_id = %run_id.as_ref()))]
    pub async fn execute_as(
        &self,
        plan: &ExecutionPlan,
        run_id: impl AsRef<str>,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, ExecutorError> {
        let levels = build_levels(&plan.graph);
        let assigned = total_tasks(&levels);
        if assigned != plan.len() {
            return Err(ExecutorError::CycleDetected {
                processed: assigned,
                total: plan.len(),
            });
        }

        let state = Arc::new(RunState::new(run_id.as_ref().to_string()));
        state.run().transition(RunStatus::Running);
        self.inner.emit(&RunEvent::RunStart {
            run_id: state.run_id.clone(),
            total_tasks: plan.len(),
            total_levels: levels.len(),
        });
        tracing::info!(
            tasks = plan.len(),
            levels = levels.len(),
            mode = ?self.inner.opts.mode,
            "run started"
        );

        let error = match self.inner.opts.mode {
            ExecutionMode::Sequential => self.run_sequential(plan, &state, &cancel).await,
            ExecutionMode::Parallel => self.run_parallel(plan, &levels, &state, &cancel).await,
        }
        .err();

        let result = {
            let mut run = state.run();
            let success = error.is_none()
                && run.tasks.len() == plan.len()
                && run.tasks.iter().all(|t| t.success);
            run.finish(success);
            run.clone()
        };

        if let Err(e) = self.inner.sink.save_run_result(&result) {
            tracing::warn!(error = %e, "failed to save run result");
        }
        self.inner.emit(&RunEvent::RunEnd {
            run_id: state.run_id.clone(),
            result: result.clone(),
        });
        match &error {
            None => tracing::info!(duration_ms = result.duration_ms(), "run completed"),
            Some(e) => tracing::warn!(error = %e, completed = result.tasks.len(), "run failed"),
        }

        Ok(RunOutcome { result, error })
    }

    async fn run_sequential(
        &self,
        plan: &ExecutionPlan,
        state: &Arc<RunState>,
        cancel: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        for task in &plan.tasks {
            run_task_contained(
                self.inner.clone(),
                state.clone(),
                task.clone(),
                cancel.clone(),
            )
            .await?;
        }
        Ok(())
    }

    async fn run_parallel(
        &self,
        plan: &ExecutionPlan,
        levels: &[super::levels::ExecutionLevel],
        state: &Arc<RunState>,
        cancel: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        let tasks: Arc<HashMap<String, ExecutionTask>> = Arc::new(
            plan.tasks
                .iter()
                .map(|t| (t.name.clone(), t.clone()))
                .collect(),
        );

        for level in levels {
            if cancel.is_cancelled() {
                return Err(ExecutorError::Cancelled);
            }

            let concurrency = self.inner.opts.concurrency_for(level.len());
            tracing::debug!(level = level.index, tasks = level.len(), concurrency, "level started");
            self.inner.emit(&RunEvent::LevelStart {
                run_id: state.run_id.clone(),
                index: level.index,
                tasks: level.tasks.clone(),
            });

            let (inner, state_ref, tasks_ref, token) =
                (self.inner.clone(), state.clone(), tasks.clone(), cancel.clone());
            let results = execute_level_parallel(&level.tasks, concurrency, move |name| {
                let (inner, state, tasks, token) =
                    (inner.clone(), state_ref.clone(), tasks_ref.clone(), token.clone());
                async move {
                    let task = tasks.get(&name).cloned().ok_or_else(|| {
                        ExecutorError::Worker(format!("task '{name}' missing from plan"))
                    })?;
                    run_task_contained(inner, state, task, token).await
                }
            })
            .await;

            let mut failed = Vec::new();
            let mut first_error = None;
            for (name, res) in results {
                if let Err(e) = res {
                    failed.push(name);
                    first_error.get_or_insert(e);
                }
            }

            self.inner.emit(&RunEvent::LevelEnd {
                run_id: state.run_id.clone(),
                index: level.index,
                failed: failed.clone(),
            });

            if let Some(source) = first_error {
                return Err(ExecutorError::LevelFailed {
                    level: level.index,
                    failed,
                    source: Box::new(source),
                });
            }
        }
        Ok(())
    }
}

impl Inner {
    fn emit(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Persist, append and announce a finished task.
    fn record(&self, state: &RunState, result: TaskResult) {
        if let Err(e) = self.sink.save_task_result(&result) {
            tracing::warn!(task = %result.task_name, error = %e, "failed to save task result");
        }
        state.run().tasks.push(result.clone());
        self.emit(&RunEvent::TaskComplete {
            run_id: state.run_id.clone(),
            result,
        });
    }
}

fn agent_task(inner: &Inner, task: &ExecutionTask) -> AgentTask {
    AgentTask {
        name: task.name.clone(),
        agent: task.agent_name.clone(),
        tool: task.tool,
        model: task.model.clone(),
        prompt: task.prompt.clone(),
        write: task.write,
        workdir: inner.opts.workdir.clone(),
    }
}

/// Run one task on its own tokio task so a panicking adapter still leaves a
/// failed `TaskResult` behind.
async fn run_task_contained(
    inner: Arc<Inner>,
    state: Arc<RunState>,
    task: ExecutionTask,
    cancel: CancellationToken,
) -> Result<(), ExecutorError> {
    let handle = tokio::spawn(run_task(
        inner.clone(),
        state.clone(),
        task.clone(),
        cancel,
    ));
    match handle.await {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(task = %task.name, error = %e, "task worker panicked");
            if !state.has_result(&task.name) {
                inner.record(
                    &state,
                    TaskResult::start(&agent_task(&inner, &task))
                        .fail(format!("worker panicked: {e}")),
                );
            }
            Err(ExecutorError::Worker(format!("task '{}' worker: {e}", task.name)))
        }
    }
}

/// Expand, dispatch, record and publish the output of one task.
async fn run_task(
    inner: Arc<Inner>,
    state: Arc<RunState>,
    task: ExecutionTask,
    cancel: CancellationToken,
) -> Result<(), ExecutorError> {
    let mut agent_task = agent_task(&inner, &task);

    if cancel.is_cancelled() {
        inner.record(&state, TaskResult::start(&agent_task).fail("cancelled before start"));
        return Err(ExecutorError::Cancelled);
    }

    let Some(agent) = inner.registry.get(task.tool) else {
        tracing::error!(task = %task.name, tool = %task.tool, "no adapter registered");
        inner.record(
            &state,
            TaskResult::start(&agent_task).fail(format!("no adapter for tool \"{}\"", task.tool)),
        );
        return Err(ExecutorError::NoAdapter {
            task: task.name,
            tool: task.tool,
        });
    };

    agent_task.prompt = state.expand(&task.prompt);

    inner.emit(&RunEvent::TaskStart {
        run_id: state.run_id.clone(),
        task: task.name.clone(),
        agent: task.agent_name.clone(),
        tool: task.tool,
        model: task.model.clone(),
    });
    tracing::debug!(task = %task.name, agent = agent.name(), "task dispatched");

    let started = TaskResult::start(&agent_task);
    match agent.run(&agent_task, &cancel).await {
        Err(source) => {
            tracing::warn!(task = %task.name, error = %source, "agent failed to run");
            inner.record(&state, started.fail(source.to_string()));
            Err(ExecutorError::Agent {
                task: task.name,
                source,
            })
        }
        Ok(output) => {
            let result = started.complete(output);
            let (success, exit_code) = (result.success, result.exit_code);
            state.set_output(&task.name, &result.stdout);
            inner.record(&state, result);

            if success {
                tracing::debug!(task = %task.name, "task succeeded");
                Ok(())
            } else {
                tracing::warn!(task = %task.name, exit_code, "task failed");
                Err(ExecutorError::TaskFailed {
                    task: task.name,
                    exit_code,
                })
            }
        }
    }
}
