//! Task tools backed by the workspace TODO.md.
//!
//! These tools allow the agent to:
//! - Add tasks with a priority
//! - List pending (or all) tasks
//! - Check off a task by a substring of its text
//!
//! Store failures (missing file, no match, I/O errors) come back as ordinary
//! tool output so the model always sees a message. Only malformed parameters
//! are reported as [`ToolError`]s.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::tool::{Tool, ToolOutput};
use crate::workspace::{Priority, TodoList, TodoOutcome};

/// Render a store outcome as tool output.
fn outcome_output(outcome: TodoOutcome, start: std::time::Instant) -> ToolOutput {
    let output = serde_json::json!({
        "success": outcome.is_success(),
        "message": outcome.message(),
    });
    ToolOutput::success(output, start.elapsed()).with_raw(outcome.to_string())
}

/// Tool for adding a task to TODO.md.
pub struct AddTaskTool {
    todo: Arc<TodoList>,
}

impl AddTaskTool {
    /// Create a new add task tool.
    pub fn new(todo: Arc<TodoList>) -> Self {
        Self { todo }
    }
}

#[async_trait]
impl Tool for AddTaskTool {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Add a task to TODO.md file in workspace root."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "Task description",
                    "minLength": 1
                },
                "priority": {
                    "type": "string",
                    "description": "Task priority: 'LOW', 'NORMAL', 'HIGH' (default: 'NORMAL')",
                    "enum": ["LOW", "NORMAL", "HIGH"],
                    "default": "NORMAL"
                }
            },
            "required": ["task"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let task = params
            .get("task")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidParameters("missing 'task' parameter".to_string()))?;

        if task.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "task cannot be empty".to_string(),
            ));
        }

        let priority = match params.get("priority").and_then(|v| v.as_str()) {
            Some(p) => p.parse::<Priority>().map_err(ToolError::InvalidParameters)?,
            None => Priority::default(),
        };

        let outcome = self.todo.add(task, priority).await;
        Ok(outcome_output(outcome, start))
    }
}

/// Tool for listing tasks in TODO.md.
pub struct ListTasksTool {
    todo: Arc<TodoList>,
}

impl ListTasksTool {
    /// Create a new list tasks tool.
    pub fn new(todo: Arc<TodoList>) -> Self {
        Self { todo }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List tasks from TODO.md file in workspace root."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "only_pending": {
                    "type": "boolean",
                    "description": "Show only pending tasks (default: true)",
                    "default": true
                }
            }
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let only_pending = match params.get("only_pending") {
            None | Some(serde_json::Value::Null) => true,
            Some(v) => v.as_bool().ok_or_else(|| {
                ToolError::InvalidParameters("'only_pending' must be a boolean".to_string())
            })?,
        };

        let outcome = self.todo.list(only_pending).await;
        let items: Vec<_> = self
            .todo
            .items()
            .await
            .into_iter()
            .filter(|item| !only_pending || !item.done)
            .collect();

        let output = serde_json::json!({
            "success": outcome.is_success(),
            "message": outcome.message(),
            "tasks": items,
        });
        Ok(ToolOutput::success(output, start.elapsed()).with_raw(outcome.to_string()))
    }
}

/// Tool for checking off a task in TODO.md.
pub struct CompleteTaskTool {
    todo: Arc<TodoList>,
}

impl CompleteTaskTool {
    /// Create a new complete task tool.
    pub fn new(todo: Arc<TodoList>) -> Self {
        Self { todo }
    }
}

#[async_trait]
impl Tool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as completed in TODO.md file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_content": {
                    "type": "string",
                    "description": "Task content or substring to match",
                    "minLength": 1
                }
            },
            "required": ["task_content"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let task_content = params
            .get("task_content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::InvalidParameters("missing 'task_content' parameter".to_string())
            })?;

        if task_content.is_empty() {
            return Err(ToolError::InvalidParameters(
                "task_content cannot be empty".to_string(),
            ));
        }

        let outcome = self.todo.complete(task_content).await;
        Ok(outcome_output(outcome, start))
    }
}
