//! Agent callback bound to the heartbeat.
//!
//! The heartbeat never talks to an LLM itself. The owner injects a callback
//! that runs the agent and returns its textual reply. Callbacks come in two
//! shapes, chosen once when the heartbeat is built:
//!
//! - [`ChannelAgent`]: receives the prompt plus the channel and chat the reply
//!   should be delivered to.
//! - [`PromptAgent`]: receives only the prompt.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::error::AgentError;

/// Where an agent reply should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Chat identifier within the channel.
    pub chat_id: String,
}

impl DeliveryTarget {
    /// Create a delivery target.
    pub fn new(channel: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Placeholder target on the local CLI channel.
    pub fn cli(chat_id: impl Into<String>) -> Self {
        Self::new("cli", chat_id)
    }
}

/// An agent that only needs the prompt.
#[async_trait]
pub trait PromptAgent: Send + Sync {
    /// Run the agent on `prompt` and return its reply.
    async fn respond(&self, prompt: &str) -> Result<String, AgentError>;
}

/// An agent that also routes its reply to a channel and chat.
#[async_trait]
pub trait ChannelAgent: Send + Sync {
    /// Run the agent on `prompt`, delivering to `target`, and return its reply.
    async fn respond(&self, prompt: &str, target: &DeliveryTarget) -> Result<String, AgentError>;
}

/// The callback invoked by the heartbeat.
#[derive(Clone)]
pub enum AgentCallback {
    /// Called with prompt, channel and chat id.
    ChannelAware(Arc<dyn ChannelAgent>),
    /// Called with the prompt only.
    PromptOnly(Arc<dyn PromptAgent>),
}

impl AgentCallback {
    /// Wrap a channel-aware agent.
    pub fn channel_aware(agent: impl ChannelAgent + 'static) -> Self {
        Self::ChannelAware(Arc::new(agent))
    }

    /// Wrap a prompt-only agent.
    pub fn prompt_only(agent: impl PromptAgent + 'static) -> Self {
        Self::PromptOnly(Arc::new(agent))
    }

    /// Short name of the callback shape, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChannelAware(_) => "channel_aware",
            Self::PromptOnly(_) => "prompt_only",
        }
    }

    /// Invoke the agent.
    ///
    /// `target` is only passed on to channel-aware agents. A panic inside the
    /// agent is reported as [`AgentError::Panicked`].
    pub async fn invoke(&self, prompt: &str, target: &DeliveryTarget) -> Result<String, AgentError> {
        let call = async {
            match self {
                Self::ChannelAware(agent) => agent.respond(prompt, target).await,
                Self::PromptOnly(agent) => agent.respond(prompt).await,
            }
        };

        AssertUnwindSafe(call)
            .catch_unwind()
            .await
            .unwrap_or(Err(AgentError::Panicked))
    }
}

impl std::fmt::Debug for AgentCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AgentCallback").field(&self.kind()).finish()
    }
}
