//! Core agent logic.
//!
//! The agent side of ironbeat covers:
//! - The callback through which the heartbeat reaches the agent
//! - Heartbeat ticks (pending-task scan, then HEARTBEAT.md instructions)
//! - The timer loop that runs ticks until stopped

mod callback;
mod heartbeat;
mod scheduler;

pub use callback::{AgentCallback, ChannelAgent, DeliveryTarget, PromptAgent};
pub use heartbeat::{
    HEARTBEAT_OK_TOKEN, HEARTBEAT_PROMPT, HeartbeatResult, HeartbeatRunner, ProactiveOutcome,
    TickReport, is_heartbeat_empty, is_heartbeat_ok, proactive_prompt,
};
pub use scheduler::{HeartbeatScheduler, spawn_heartbeat};
