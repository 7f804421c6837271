//! ironbeat binary.
//!
//! Runs the heartbeat against a workspace with a dry-run agent: every prompt
//! is logged along with the pending tasks from TODO.md, and the agent always
//! answers `HEARTBEAT_OK`. Stop with Ctrl-C.

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use ironbeat::agent::{
    AgentCallback, ChannelAgent, DeliveryTarget, HEARTBEAT_OK_TOKEN, HeartbeatRunner,
    HeartbeatScheduler,
};
use ironbeat::config::HeartbeatConfig;
use ironbeat::error::AgentError;
use ironbeat::tools::ToolRegistry;
use ironbeat::workspace::{TodoList, Workspace};

/// Agent stand-in that inspects the task list but never acts.
struct DryRunAgent {
    tools: ToolRegistry,
}

#[async_trait]
impl ChannelAgent for DryRunAgent {
    async fn respond(&self, prompt: &str, target: &DeliveryTarget) -> Result<String, AgentError> {
        tracing::info!(
            channel = %target.channel,
            chat_id = %target.chat_id,
            "Agent prompt:\n{}",
            prompt
        );

        let pending = self
            .tools
            .execute("list_tasks", serde_json::json!({ "only_pending": true }))
            .await
            .map_err(|e| AgentError::InvocationFailed(e.to_string()))?;
        tracing::info!("{}", pending.as_text());

        Ok(HEARTBEAT_OK_TOKEN.to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads .env before reading RUST_LOG and the heartbeat settings.
    let config = HeartbeatConfig::from_env();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ironbeat=info"));
    if std::env::var("IRONBEAT_LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = config?;
    tracing::info!(workspace = %config.workspace.display(), "Loaded heartbeat config");

    let todo = Arc::new(TodoList::new(Workspace::new(config.workspace.clone())));
    let mut tools = ToolRegistry::new();
    tools.register_todo_tools(todo);

    let runner = HeartbeatRunner::new(config)
        .with_callback(AgentCallback::channel_aware(DryRunAgent { tools }));
    let scheduler = HeartbeatScheduler::new(runner);

    if !scheduler.start()? {
        return Ok(());
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down heartbeat");
    scheduler.shutdown().await;

    Ok(())
}
