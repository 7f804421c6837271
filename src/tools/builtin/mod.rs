//! Built-in tools that come with the agent.

mod todo;

pub use todo::{AddTaskTool, CompleteTaskTool, ListTasksTool};
