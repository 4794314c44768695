use std::path::PathBuf;
use std::process::Stdio;

use cortex_core::api::{AgentError, AgentOutput};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One external command to run for a task.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
    /// Echo output lines to the terminal as they arrive, tagged with this label.
    pub stream_label: Option<String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
            stream_label: None,
        }
    }

    pub fn workdir(mut self, dir: Option<PathBuf>) -> Self {
        self.workdir = dir;
        self
    }

    pub fn stream(mut self, label: Option<String>) -> Self {
        self.stream_label = label;
        self
    }
}

/// Run `spec` to completion, capturing stdout and stderr.
///
/// The child is killed if `cancel` fires first. A process killed by a signal
/// reports exit code -1.
pub async fn run_process(
    spec: &ProcessSpec,
    cancel: &CancellationToken,
) -> Result<AgentOutput, AgentError> {
    if cancel.is_cancelled() {
        return Err(AgentError::Cancelled);
    }

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.workdir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| AgentError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    tracing::debug!(program = %spec.program, pid = ?child.id(), "process spawned");

    let stdout = child
        .stdout
        .take()
        .map(|s| capture(s, spec.stream_label.clone(), false));
    let stderr = child
        .stderr
        .take()
        .map(|s| capture(s, spec.stream_label.clone(), true));

    let status = tokio::select! {
        status = child.wait() => status.map_err(|source| AgentError::StreamIo {
            stream: "wait",
            source,
        })?,
        _ = cancel.cancelled() => {
            if let Err(e) = child.kill().await {
                tracing::warn!(program = %spec.program, error = %e, "failed to kill cancelled process");
            }
            for reader in [stdout, stderr].into_iter().flatten() {
                reader.abort();
            }
            tracing::info!(program = %spec.program, "process cancelled");
            return Err(AgentError::Cancelled);
        }
    };

    let stdout = collect(stdout, "stdout").await?;
    let stderr = collect(stderr, "stderr").await?;
    let exit_code = status.code().unwrap_or(-1);
    tracing::debug!(program = %spec.program, exit_code, "process exited");

    Ok(AgentOutput::from_exit(stdout, stderr, exit_code))
}

/// Probe that `program` starts and exits zero with `args`.
pub async fn probe(program: &str, args: &[&str]) -> Result<(), AgentError> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| AgentError::Unavailable {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(AgentError::Unavailable {
            program: program.to_string(),
            reason: format!("exited with {status}"),
        })
    }
}

fn capture<R>(
    reader: R,
    label: Option<String>,
    is_stderr: bool,
) -> JoinHandle<std::io::Result<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut out = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            if let Some(label) = &label {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end_matches(['\r', '\n']);
                if is_stderr {
                    eprintln!("  [{label}] {text}");
                } else {
                    println!("  [{label}] {text}");
                }
            }
            out.extend_from_slice(&line);
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    })
}

async fn collect(
    handle: Option<JoinHandle<std::io::Result<String>>>,
    stream: &'static str,
) -> Result<String, AgentError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    match handle.await {
        Ok(res) => res.map_err(|source| AgentError::StreamIo { stream, source }),
        Err(e) => Err(AgentError::StreamIo {
            stream,
            source: std::io::Error::other(e.to_string()),
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> ProcessSpec {
        ProcessSpec::new("/bin/sh", vec!["-c".into(), script.into()])
    }

    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let out = run_process(&sh("echo out; echo err >&2; exit 3"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert_eq!(out.exit_code, 3);
        assert!(!out.success);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let spec = ProcessSpec::new("/definitely/not/here", vec![]);
        let err = run_process(&spec, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::Spawn { .. }));
    }

    #[tokio::test]
    async fn cancellation_kills_the_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = run_process(&sh("sleep 30"), &cancel).await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn runs_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let spec = sh("pwd").workdir(Some(dir.path().to_path_buf()));
        let out = run_process(&spec, &CancellationToken::new()).await.unwrap();
        let expected = dir.path().canonicalize().unwrap();
        let got = std::path::PathBuf::from(out.stdout.trim()).canonicalize().unwrap();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn probe_reports_unavailable() {
        assert!(probe("/bin/sh", &["-c", "echo ok"]).await.is_ok());
        let err = probe("/definitely/not/here", &["--version"]).await.unwrap_err();
        assert!(matches!(err, AgentError::Unavailable { .. }));
    }
}
