//! TODO.md checklist store.
//!
//! Tasks are markdown checklist lines:
//!
//! ```text
//! # TODO
//!
//! - [ ] [HIGH] Review project documentation
//! - [x] [NORMAL] Update test cases
//! ```
//!
//! Lines are never reordered or removed. New tasks are appended to the end of
//! the file and completion flips the marker in place, leaving every other
//! byte of the file untouched.
//!
//! Operations are fail-soft: they return a [`TodoOutcome`] whose text is shown
//! to the model, never an error.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::workspace::{DocType, Workspace};

/// Content written to a fresh TODO.md before the first task.
pub const TODO_HEADER: &str = "# TODO\n\n";

/// Markers that denote a pending task.
pub const PENDING_MARKERS: [&str; 2] = ["- [ ]", "* [ ]"];

/// Checked counterparts of [`PENDING_MARKERS`], index for index.
pub const CHECKED_MARKERS: [&str; 2] = ["- [x]", "* [x]"];

/// Text following a task marker: an optional priority tag, then the description.
static TASK_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[(LOW|NORMAL|HIGH)\](?:\s+|$))?(.*?)\s*$")
        .expect("task body pattern is valid")
});

/// Whether the text contains at least one pending task marker.
pub fn contains_pending(text: &str) -> bool {
    PENDING_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Position of the leftmost of `markers` in `line`, with its index in the list.
fn find_marker(line: &str, markers: &[&str]) -> Option<(usize, usize)> {
    markers
        .iter()
        .enumerate()
        .filter_map(|(which, marker)| line.find(marker).map(|at| (at, which)))
        .min()
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Get the string representation used in TODO.md.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "NORMAL" => Ok(Priority::Normal),
            "HIGH" => Ok(Priority::High),
            _ => Err(format!(
                "invalid priority '{}', must be 'LOW', 'NORMAL' or 'HIGH'",
                s
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    /// Whether the task is checked off.
    pub done: bool,
    /// Bracketed tag after the marker, if any (e.g. `HIGH`).
    pub priority: Option<String>,
    /// Free-text description.
    pub description: String,
}

impl TodoItem {
    /// Parse a checklist line. Returns `None` for anything that isn't one.
    ///
    /// A line is pending exactly when [`contains_pending`] holds for it, so
    /// parsed items agree with the pending listing. The priority tag is only
    /// recognised for `LOW`, `NORMAL` and `HIGH`; any other bracketed text is
    /// part of the description.
    pub fn parse(line: &str) -> Option<Self> {
        let (done, at, marker) = match find_marker(line, &PENDING_MARKERS) {
            Some((at, which)) => (false, at, PENDING_MARKERS[which]),
            None => {
                let (at, which) = find_marker(line, &CHECKED_MARKERS)?;
                (true, at, CHECKED_MARKERS[which])
            }
        };

        let caps = TASK_BODY.captures(&line[at + marker.len()..])?;
        Some(Self {
            done,
            priority: caps.get(1).map(|m| m.as_str().to_string()),
            description: caps[2].to_string(),
        })
    }
}

/// Outcome of a task list operation.
///
/// Displays as the plain message, so callers expecting text can use it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoOutcome {
    Success(String),
    Failure(String),
}

impl TodoOutcome {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, TodoOutcome::Success(_))
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            TodoOutcome::Success(msg) | TodoOutcome::Failure(msg) => msg,
        }
    }
}

impl fmt::Display for TodoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Task list persisted in the workspace's TODO.md.
#[derive(Debug, Clone)]
pub struct TodoList {
    workspace: Workspace,
}

impl TodoList {
    /// Create a task list backed by the given workspace.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// Append a pending task, creating TODO.md with a header if needed.
    ///
    /// Multi-line descriptions are folded onto one line so the task stays a
    /// single checklist entry.
    pub async fn add(&self, description: &str, priority: Priority) -> TodoOutcome {
        let description = description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if description.is_empty() {
            return TodoOutcome::Failure(
                "Error adding task: task description cannot be empty".to_string(),
            );
        }

        let existing = match self.workspace.read(DocType::Todo).await {
            Ok(existing) => existing,
            Err(e) => return TodoOutcome::Failure(format!("Error adding task: {}", e)),
        };

        let mut entry = String::new();
        match existing {
            None => {
                if let Err(e) = self.workspace.write(DocType::Todo, TODO_HEADER).await {
                    return TodoOutcome::Failure(format!("Error adding task: {}", e));
                }
            }
            // Keep the new task off a last line that lacks its newline.
            Some(content) if !content.is_empty() && !content.ends_with('\n') => entry.push('\n'),
            Some(_) => {}
        }
        entry.push_str(&format!("- [ ] [{}] {}\n", priority, description));

        if let Err(e) = self.workspace.append(DocType::Todo, &entry).await {
            return TodoOutcome::Failure(format!("Error adding task: {}", e));
        }

        tracing::debug!(priority = %priority, "Added task to TODO.md");
        TodoOutcome::Success(format!(
            "Task added: '{}' with priority {}",
            description, priority
        ))
    }

    /// List pending task lines, or every line of the file.
    pub async fn list(&self, only_pending: bool) -> TodoOutcome {
        let content = match self.workspace.read(DocType::Todo).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                return TodoOutcome::Success(
                    "No TODO.md file found. No tasks to list.".to_string(),
                );
            }
            Err(e) => return TodoOutcome::Failure(format!("Error listing tasks: {}", e)),
        };

        let lines: Vec<&str> = content.lines().collect();

        if only_pending {
            let pending: Vec<&str> = lines
                .into_iter()
                .filter(|line| contains_pending(line))
                .collect();
            if pending.is_empty() {
                return TodoOutcome::Success("No pending tasks found.".to_string());
            }
            TodoOutcome::Success(format!("Pending tasks:\n{}", pending.join("\n")))
        } else {
            if lines.is_empty() {
                return TodoOutcome::Success("TODO.md is empty.".to_string());
            }
            TodoOutcome::Success(format!("All tasks:\n{}", lines.join("\n")))
        }
    }

    /// Parse every checklist line in TODO.md, in file order.
    ///
    /// A missing or unreadable file yields no items.
    pub async fn items(&self) -> Vec<TodoItem> {
        self.workspace
            .read_lossy(DocType::Todo)
            .await
            .map(|content| content.lines().filter_map(TodoItem::parse).collect())
            .unwrap_or_default()
    }

    /// Check off the first pending task whose line contains `task_content`.
    ///
    /// Only the topmost match is changed, even when several lines match.
    pub async fn complete(&self, task_content: &str) -> TodoOutcome {
        if task_content.is_empty() {
            return TodoOutcome::Failure(
                "Error completing task: task content cannot be empty".to_string(),
            );
        }

        let content = match self.workspace.read(DocType::Todo).await {
            Ok(Some(content)) => content,
            Ok(None) => return TodoOutcome::Failure("Error: TODO.md file not found.".to_string()),
            Err(e) => return TodoOutcome::Failure(format!("Error completing task: {}", e)),
        };

        let mut updated = String::with_capacity(content.len());
        let mut found = false;
        for line in content.split_inclusive('\n') {
            if !found && line.contains(task_content) {
                if let Some(checked) = check_off(line) {
                    updated.push_str(&checked);
                    found = true;
                    continue;
                }
            }
            updated.push_str(line);
        }

        if !found {
            return TodoOutcome::Failure(format!(
                "Error: Task containing '{}' not found in TODO.md",
                task_content
            ));
        }

        if let Err(e) = self.workspace.write(DocType::Todo, &updated).await {
            return TodoOutcome::Failure(format!("Error completing task: {}", e));
        }

        tracing::debug!("Marked task as completed in TODO.md");
        TodoOutcome::Success(format!("Task marked as completed: '{}'", task_content))
    }
}

/// Rewrite the first pending marker on the line to its checked form.
fn check_off(line: &str) -> Option<String> {
    let (at, which) = find_marker(line, &PENDING_MARKERS)?;

    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..at]);
    out.push_str(CHECKED_MARKERS[which]);
    out.push_str(&line[at + PENDING_MARKERS[which].len()..]);
    Some(out)
}
