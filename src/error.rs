//! Error types for ironbeat.

use std::path::PathBuf;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),
}

/// Workspace file errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{doc} is read-only")]
    ReadOnly { doc: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Errors reported by the agent callback bound to the heartbeat.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent invocation failed: {0}")]
    InvocationFailed(String),

    #[error("Agent panicked during heartbeat")]
    Panicked,
}

/// Heartbeat lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("Heartbeat is already running")]
    AlreadyRunning,

    #[error("Heartbeat must be started from within a Tokio runtime")]
    NoRuntime,
}
