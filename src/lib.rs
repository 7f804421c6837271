//! ironbeat: a heartbeat for a proactive personal agent.
//!
//! Two pieces share a workspace directory:
//!
//! - [`workspace::TodoList`] keeps a markdown checklist in `TODO.md`, exposed
//!   to the model through the tools in [`tools::builtin`].
//! - [`agent::HeartbeatScheduler`] wakes the agent on a timer: first a
//!   zero-token scan of `TODO.md` for pending tasks, then the instructions in
//!   `HEARTBEAT.md`.
//!
//! The agent itself is injected as an [`agent::AgentCallback`].

pub mod agent;
pub mod config;
pub mod error;
pub mod tools;
pub mod workspace;
