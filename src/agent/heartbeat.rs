//! Proactive heartbeat execution.
//!
//! Every tick runs two checks, cheapest first:
//!
//! 1. **Pending tasks.** TODO.md is scanned for unchecked boxes without
//!    invoking the agent. Only if something is pending (and proactive
//!    notifications are configured) is the agent woken with the file content.
//! 2. **Instructions.** HEARTBEAT.md is read; if it holds anything actionable
//!    the agent is asked to follow it and reply `HEARTBEAT_OK` when there is
//!    nothing to do.
//!
//! Neither check ever fails a tick. Unreadable files count as absent and
//! agent errors are logged.

use crate::agent::callback::{AgentCallback, DeliveryTarget};
use crate::config::HeartbeatConfig;
use crate::error::AgentError;
use crate::workspace::{DocType, Workspace, contains_pending};

/// Prompt sent to the agent when HEARTBEAT.md has actionable content.
pub const HEARTBEAT_PROMPT: &str = "Read HEARTBEAT.md in your workspace (if it exists).
Follow any instructions or tasks listed there.
If nothing needs attention, reply with just: HEARTBEAT_OK";

/// Reply token meaning "nothing to do".
pub const HEARTBEAT_OK_TOKEN: &str = "HEARTBEAT_OK";

/// Trimmed lines that carry no instructions on their own.
const EMPTY_CHECKBOXES: [&str; 4] = ["- [ ]", "* [ ]", "- [x]", "* [x]"];

/// Longest reply excerpt written to the logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Build the wake-up prompt for pending TODO.md tasks.
pub fn proactive_prompt(todo_content: &str) -> String {
    format!(
        "SYSTEM_WAKEUP: Pending tasks detected in TODO.md:\n\n{}\n\n\
         Instruction: Check these tasks. If action is required, execute it. \
         If a task is completed, use 'complete_task' tool to mark it [x].",
        todo_content
    )
}

/// Check whether HEARTBEAT.md content has nothing actionable.
///
/// Blank lines, headings, HTML comments and bare checkboxes don't count.
pub fn is_heartbeat_empty(content: Option<&str>) -> bool {
    let Some(content) = content else {
        return true;
    };

    !content.lines().map(str::trim).any(|line| {
        !(line.is_empty()
            || line.starts_with('#')
            || line.starts_with("<!--")
            || EMPTY_CHECKBOXES.contains(&line))
    })
}

/// Check whether an agent reply means "nothing to do".
///
/// Case and underscores are ignored, so `heartbeat_ok` and `HEARTBEATOK` match.
pub fn is_heartbeat_ok(response: &str) -> bool {
    let token = HEARTBEAT_OK_TOKEN.replace('_', "");
    response.to_uppercase().replace('_', "").contains(&token)
}

/// Result of the HEARTBEAT.md check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The agent replied that nothing needs attention.
    Ok,
    /// The agent acted on the instructions; holds its reply.
    TaskExecuted(String),
    /// Nothing actionable, or no agent bound.
    Skipped,
    /// The agent call failed.
    Failed(String),
}

/// Result of the TODO.md pending-task check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProactiveOutcome {
    /// TODO.md is missing or has no unchecked boxes.
    NoPendingTasks,
    /// Tasks are pending but proactive notifications are off or unbound.
    Inactive,
    /// The agent was woken; holds its reply.
    Notified(String),
    /// The agent call failed.
    Failed(String),
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub proactive: ProactiveOutcome,
    pub heartbeat: HeartbeatResult,
}

/// Runs heartbeat ticks against a workspace.
#[derive(Debug)]
pub struct HeartbeatRunner {
    config: HeartbeatConfig,
    workspace: Workspace,
    callback: Option<AgentCallback>,
}

impl HeartbeatRunner {
    /// Create a runner with no agent bound.
    pub fn new(config: HeartbeatConfig) -> Self {
        let workspace = Workspace::new(config.workspace.clone());
        Self {
            config,
            workspace,
            callback: None,
        }
    }

    /// Bind the agent callback.
    pub fn with_callback(mut self, callback: AgentCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &HeartbeatConfig {
        &self.config
    }

    /// Execute a single heartbeat tick.
    pub async fn tick(&self) -> TickReport {
        let proactive = self.check_pending_tasks().await;
        let heartbeat = self.check_instructions().await;
        TickReport {
            proactive,
            heartbeat,
        }
    }

    /// Wake the agent if TODO.md has pending tasks. No agent call otherwise.
    pub async fn check_pending_tasks(&self) -> ProactiveOutcome {
        let content = match self.workspace.read_lossy(DocType::Todo).await {
            Some(content) if contains_pending(&content) => content,
            _ => return ProactiveOutcome::NoPendingTasks,
        };

        let callback = match &self.callback {
            Some(callback) if self.config.proactive_active() => callback,
            _ => {
                tracing::debug!("Pending tasks in TODO.md, but proactive heartbeat is inactive");
                return ProactiveOutcome::Inactive;
            }
        };

        tracing::info!("Proactive heartbeat: pending tasks in TODO.md");

        let target = DeliveryTarget::new(
            self.config.proactive_channel.clone(),
            self.config.proactive_chat_id.clone(),
        );
        match callback.invoke(&proactive_prompt(&content), &target).await {
            Ok(response) => {
                tracing::info!(
                    callback = callback.kind(),
                    channel = %target.channel,
                    "Proactive heartbeat completed: {}",
                    preview(&response)
                );
                ProactiveOutcome::Notified(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Proactive heartbeat failed");
                ProactiveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Ask the agent to act on HEARTBEAT.md if it holds anything actionable.
    pub async fn check_instructions(&self) -> HeartbeatResult {
        let content = self.workspace.heartbeat_checklist().await;
        if is_heartbeat_empty(content.as_deref()) {
            tracing::debug!("Heartbeat: no tasks (HEARTBEAT.md empty)");
            return HeartbeatResult::Skipped;
        }

        let Some(callback) = &self.callback else {
            tracing::debug!("Heartbeat: HEARTBEAT.md has tasks but no agent is bound");
            return HeartbeatResult::Skipped;
        };

        tracing::info!("Heartbeat: checking for tasks...");

        match callback
            .invoke(HEARTBEAT_PROMPT, &DeliveryTarget::cli("heartbeat"))
            .await
        {
            Ok(response) if is_heartbeat_ok(&response) => {
                tracing::info!("Heartbeat: OK (no action needed)");
                HeartbeatResult::Ok
            }
            Ok(response) => {
                tracing::info!("Heartbeat: completed task: {}", preview(&response));
                HeartbeatResult::TaskExecuted(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Heartbeat execution failed");
                HeartbeatResult::Failed(e.to_string())
            }
        }
    }

    /// Run the instructions prompt immediately, outside the timer cadence.
    ///
    /// Returns `None` when no agent is bound. Channel-aware agents receive the
    /// placeholder target `cli`/`trigger`.
    pub async fn trigger_now(&self) -> Result<Option<String>, AgentError> {
        let Some(callback) = &self.callback else {
            return Ok(None);
        };

        tracing::info!("Heartbeat: manual trigger");
        callback
            .invoke(HEARTBEAT_PROMPT, &DeliveryTarget::cli("trigger"))
            .await
            .map(Some)
    }

}

fn preview(response: &str) -> String {
    if response.is_empty() {
        return "no response".to_string();
    }
    response.chars().take(LOG_PREVIEW_CHARS).collect()
}
