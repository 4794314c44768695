use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::ExecutorError;

/// Execute one level of tasks on the runtime's worker threads
///
/// # Arguments
///
/// * `task_names` - Tasks in this level
/// * `max_concurrency` - Maximum number of tasks running at once
/// * `executor_fn` - Async function to execute a single task
///
/// # Returns
///
/// One entry per task, in `task_names` order. Every task is awaited before
/// returning, whether or not its siblings failed; a panicking worker is
/// reported as `ExecutorError::Worker`.
pub async fn execute_level_parallel<F, Fut, R>(
    task_names: &[String],
    max_concurrency: usize,
    executor_fn: F,
) -> Vec<(String, Result<R, ExecutorError>)>
where
    F: Fn(String) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<R, ExecutorError>> + Send + 'static,
    R: Send + 'static,
{
    let sem = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(task_names.len());

    for name in task_names {
        let sem = sem.clone();
        let executor = executor_fn.clone();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|_| ExecutorError::Worker("semaphore closed unexpectedly".into()))?;

            executor(task_name).await
        });
        handles.push((name.clone(), handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let res = match handle.await {
            Ok(res) => res,
            Err(e) => Err(ExecutorError::Worker(format!("task '{name}' worker: {e}"))),
        };
        results.push((name, res));
    }

    results
}
