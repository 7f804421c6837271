//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ToolError;
use crate::tools::builtin::{AddTaskTool, CompleteTaskTool, ListTasksTool};
use crate::tools::tool::{Tool, ToolDefinition, ToolOutput};
use crate::workspace::TodoList;

/// Registry of available tools, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced previously registered tool");
        }
    }

    /// Register the TODO.md task tools.
    pub fn register_todo_tools(&mut self, todo: Arc<TodoList>) {
        self.register(Arc::new(AddTaskTool::new(Arc::clone(&todo))));
        self.register(Arc::new(ListTasksTool::new(Arc::clone(&todo))));
        self.register(Arc::new(CompleteTaskTool::new(todo)));
        tracing::debug!("Registered TODO.md task tools");
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Definitions of all registered tools, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    #[tokio::test]
    async fn test_register_todo_tools() {
        let dir = tempfile::tempdir().unwrap();
        let todo = Arc::new(TodoList::new(Workspace::new(dir.path())));

        let mut registry = ToolRegistry::new();
        registry.register_todo_tools(todo);
        assert_eq!(registry.count(), 3);

        let names: Vec<_> = registry
            .tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["add_task", "complete_task", "list_tasks"]);

        let output = registry
            .execute("add_task", serde_json::json!({"task": "stretch"}))
            .await
            .unwrap();
        assert_eq!(output.as_text(), "Task added: 'stretch' with priority NORMAL");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }
}
