//! Tools the agent can call.

pub mod builtin;
mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition, ToolOutput};
