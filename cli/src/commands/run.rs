//! `cortex run`: execute workflow files.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cortex_core::api as core_api;
use cortex_core::api::{
    CliError, ErrorCode, ExecutionMode, ExecutionObserver, ExecutionOpts, Executor, FileStore,
    NoopSink, ProgressMonitor, ResultSink,
};
use cortex_plugins::factory::{build_registry, build_renderer, build_webhook};
use tokio_util::sync::CancellationToken;

use crate::commands::cli::{OutputFormat, RunArgs};
use crate::commands::validate::load_checked;
use crate::output::{detect_painter, Painter};

#[tracing::instrument(name = "cmd.run", skip_all, fields(files = args.files.len()))]
pub async fn handle_run(args: RunArgs, cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    let cwd = std::env::current_dir()?;
    let files = core_api::resolve_workflow_files(&args.files, &cwd)?;
    let p = detect_painter(args.no_color);

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    if files.len() == 1 {
        run_file(&files[0], &cwd, &args, cfg, &p, &cancel).await?;
        return Ok(ErrorCode::Success.exit_code());
    }

    let mut succeeded = 0;
    for (i, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        if args.output == OutputFormat::Text {
            println!(
                "{} {}",
                p.dim(&format!("[{}/{}]", i + 1, files.len())),
                p.bold(&path.display().to_string())
            );
        }
        match run_file(path, &cwd, &args, cfg, &p, &cancel).await {
            Ok(()) => succeeded += 1,
            Err(e) => eprintln!("{}: {e}", path.display()),
        }
    }

    if args.output == OutputFormat::Text {
        let line = format!("{succeeded}/{} workflows succeeded", files.len());
        if succeeded == files.len() {
            println!("{}", p.green(&line));
        } else {
            println!("{}", p.red(&line));
        }
    }

    Ok(if cancel.is_cancelled() {
        ErrorCode::Cancelled.exit_code()
    } else if succeeded == files.len() {
        ErrorCode::Success.exit_code()
    } else {
        ErrorCode::WorkflowFailed.exit_code()
    })
}

async fn run_file(
    path: &Path,
    cwd: &Path,
    args: &RunArgs,
    cfg: &core_api::AppConfig,
    p: &Painter,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let text = args.output == OutputFormat::Text;

    let workflow = load_checked(path, cfg)?;
    let settings = cfg.resolve_settings(&workflow.settings, &args.overrides());
    let plan = core_api::build_plan(&workflow)?;
    let project = core_api::project_name(cwd);

    let mut opts = ExecutionOpts::from_settings(&settings);
    if let Some(dir) = workflow.workdir.as_deref().filter(|d| !d.trim().is_empty()) {
        opts = opts.with_workdir(PathBuf::from(dir));
    }

    if text {
        match opts.mode {
            ExecutionMode::Parallel => {
                let levels = plan.levels();
                let width = settings
                    .max_parallel
                    .min(core_api::max_parallelism(&levels))
                    .max(1);
                println!(
                    "Parallel execution: {} levels, up to {} concurrent tasks",
                    p.cyan(&levels.len().to_string()),
                    p.cyan(&width.to_string())
                );
            }
            ExecutionMode::Sequential => println!("Sequential execution"),
        }
        print!("{plan}");
        println!();
    }

    let store = if args.no_save {
        None
    } else {
        Some(FileStore::create(&core_api::sessions_root(cfg)?, &project)?)
    };
    let run_id = store
        .as_ref()
        .map(|s| s.run_id().to_string())
        .unwrap_or_else(core_api::generate_run_id);
    let run_dir = store.as_ref().map(|s| s.run_dir().to_path_buf());
    let sink: Arc<dyn ResultSink> = match store {
        Some(store) => Arc::new(store),
        None => Arc::new(NoopSink),
    };

    let mut observers: Vec<Arc<dyn ExecutionObserver>> = Vec::new();
    if text && args.progress && atty::is(atty::Stream::Stdout) {
        observers.push(Arc::new(ProgressMonitor::new(true)));
    } else {
        observers.push(build_renderer(
            args.output.as_str(),
            *p,
            settings.verbose,
        ));
    }
    let webhook = build_webhook(cfg, &project)?;
    if let Some(hook) = &webhook {
        observers.push(hook.clone());
    }

    let executor = Executor::builder(build_registry(settings.stream))
        .sink(sink)
        .observers(observers)
        .opts(opts)
        .build();

    tracing::info!(file = %path.display(), run_id = %run_id, "starting workflow");
    let outcome = executor.execute_as(&plan, &run_id, cancel.clone()).await;

    if let Some(hook) = &webhook {
        hook.wait().await;
    }
    let outcome = outcome?;

    if text {
        if let Some(dir) = &run_dir {
            println!("{} {}", p.dim("Results saved to"), dir.display());
        }
    }

    match outcome.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Cancel `cancel` on Ctrl-C or SIGTERM.
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        eprintln!("\nReceived interrupt, cancelling...");
        tracing::warn!("interrupt received, cancelling run");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
