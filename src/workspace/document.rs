//! Workspace document kinds.

/// A well-known file in the agent workspace.
///
/// - **Todo**: Checklist of tasks managed through the task tools (TODO.md)
/// - **Heartbeat**: Free-form instructions read on every heartbeat (HEARTBEAT.md)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    /// Task checklist (TODO.md).
    Todo,
    /// Periodic instructions (HEARTBEAT.md).
    Heartbeat,
}

impl DocType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Todo => "todo",
            DocType::Heartbeat => "heartbeat",
        }
    }

    /// File name relative to the workspace root.
    pub fn file_name(&self) -> &'static str {
        match self {
            DocType::Todo => "TODO.md",
            DocType::Heartbeat => "HEARTBEAT.md",
        }
    }

    /// Whether the agent writes this document through its tools.
    ///
    /// HEARTBEAT.md is owned by the user and only ever read.
    pub fn is_writable(&self) -> bool {
        matches!(self, DocType::Todo)
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(DocType::Todo.file_name(), "TODO.md");
        assert_eq!(DocType::Heartbeat.file_name(), "HEARTBEAT.md");
        assert_eq!(DocType::Heartbeat.to_string(), "HEARTBEAT.md");
    }

    #[test]
    fn test_writable_documents() {
        assert!(DocType::Todo.is_writable());
        assert!(!DocType::Heartbeat.is_writable());
    }

    #[test]
    fn test_doc_type_display() {
        assert_eq!(DocType::Todo.as_str(), "todo");
        assert_eq!(DocType::Heartbeat.as_str(), "heartbeat");
    }
}
