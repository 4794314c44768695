use std::sync::Arc;

use anyhow::Result;

use cortex_core::api::{AgentRegistry, AppConfig, ExecutionObserver, Tool};

use crate::agents::{ClaudeCodeAgent, OpenCodeAgent, ShellAgent};
use crate::renderers::{JsonlRenderer, Painter, TextRenderer};
use crate::webhook::WebhookNotifier;

/// Registry with an adapter for every supported tool.
pub fn build_registry(stream: bool) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry
        .register(
            Tool::ClaudeCode,
            Arc::new(ClaudeCodeAgent::new().streaming(stream)),
        )
        .register(Tool::OpenCode, Arc::new(OpenCodeAgent::new().streaming(stream)))
        .register(Tool::Shell, Arc::new(ShellAgent::new().streaming(stream)));
    registry
}

pub fn build_renderer(format: &str, painter: Painter, verbose: bool) -> Arc<dyn ExecutionObserver> {
    match format {
        "jsonl" => Arc::new(JsonlRenderer),
        // Anything other than jsonl renders as text.
        _ => Arc::new(TextRenderer::new(painter, verbose)),
    }
}

/// Notifier for the configured webhooks, if there are any.
pub fn build_webhook(cfg: &AppConfig, project: &str) -> Result<Option<Arc<WebhookNotifier>>> {
    if cfg.webhooks.is_empty() {
        return Ok(None);
    }
    let notifier = WebhookNotifier::new(cfg.webhooks.clone(), project)?;
    if notifier.is_empty() {
        return Ok(None);
    }
    Ok(Some(Arc::new(notifier)))
}
