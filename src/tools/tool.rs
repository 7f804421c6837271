//! Tool trait and shared output types.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ToolError;

/// Output from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Structured result.
    pub result: serde_json::Value,
    /// Plain text shown to the model, if the tool produces one.
    pub raw: Option<String>,
    /// How long the tool took.
    pub duration: Duration,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self {
            result,
            raw: None,
            duration,
        }
    }

    /// Attach the plain-text rendering.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Text to hand back to the model: the raw text if present, else the JSON.
    pub fn as_text(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => self.result.to_string(),
        }
    }
}

/// Tool definition advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;

    /// Build the definition advertised to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
