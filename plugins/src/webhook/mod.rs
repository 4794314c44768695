//! Webhook notifications for run and task lifecycle events.

mod payload;

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use cortex_core::api::{ExecutionObserver, RunEvent, WebhookConfig};
use tokio::task::JoinHandle;

pub use payload::{
    RunPayload, TaskPayload, WebhookEvent, EVENT_RUN_COMPLETE, EVENT_RUN_START,
    EVENT_TASK_COMPLETE, EVENT_TASK_FAILED, EVENT_TASK_START,
};

const USER_AGENT: &str = "Cortex/1.0";
const TIMEOUT: Duration = Duration::from_secs(10);
const BODY_PREVIEW_LIMIT: usize = 256;

/// Posts lifecycle events to the configured webhooks.
///
/// Deliveries run in the background; call [`WebhookNotifier::wait`] before
/// exiting so none are lost.
pub struct WebhookNotifier {
    client: reqwest::Client,
    hooks: Vec<WebhookConfig>,
    project: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl WebhookNotifier {
    pub fn new(hooks: Vec<WebhookConfig>, project: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            hooks: hooks
                .into_iter()
                .filter(|h| !h.url.trim().is_empty())
                .collect(),
            project: project.into(),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Queue `event` for every webhook subscribed to it.
    pub fn dispatch(&self, event: WebhookEvent) {
        let targets: Vec<WebhookConfig> = self
            .hooks
            .iter()
            .filter(|h| h.matches_event(event.event))
            .cloned()
            .collect();
        if targets.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(event = event.event, "no async runtime, webhook dropped");
            return;
        };

        let mut pending = match self.pending.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.retain(|h| !h.is_finished());
        for hook in targets {
            let client = self.client.clone();
            let event = event.clone();
            pending.push(runtime.spawn(async move {
                if let Err(e) = send(&client, &hook, &event).await {
                    tracing::warn!(
                        url = %hook.url,
                        event = event.event,
                        error = %e,
                        "webhook delivery failed"
                    );
                }
            }));
        }
    }

    /// Wait for all queued deliveries to finish.
    pub async fn wait(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = match self.pending.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            pending.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "webhook task panicked");
            }
        }
    }
}

impl ExecutionObserver for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    fn on_event(&self, event: &RunEvent) {
        let payload = match event {
            RunEvent::RunStart { run_id, .. } => WebhookEvent::run_start(run_id, &self.project),
            RunEvent::TaskStart {
                run_id,
                task,
                agent,
                tool,
                model,
            } => WebhookEvent::task_start(
                run_id,
                &self.project,
                task,
                agent,
                *tool,
                model.as_deref(),
            ),
            RunEvent::TaskComplete { run_id, result } => {
                WebhookEvent::task_end(run_id, &self.project, result)
            }
            RunEvent::RunEnd { result, .. } => WebhookEvent::run_complete(&self.project, result),
            RunEvent::LevelStart { .. } | RunEvent::LevelEnd { .. } => return,
        };
        self.dispatch(payload);
    }
}

/// Deliver one event; any status of 400 or above is an error.
pub async fn send(
    client: &reqwest::Client,
    hook: &WebhookConfig,
    event: &WebhookEvent,
) -> Result<()> {
    let mut req = client.post(&hook.url).json(event);
    for (name, value) in &hook.headers {
        req = req.header(name.as_str(), value.as_str());
    }

    let resp = req.send().await?;
    let status = resp.status();
    tracing::debug!(url = %hook.url, event = event.event, status = %status, "webhook delivered");
    if status.as_u16() < 400 {
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    let preview: String = body.trim().chars().take(BODY_PREVIEW_LIMIT).collect();
    anyhow::bail!("webhook {} returned {}: {}", hook.url, status, preview)
}
