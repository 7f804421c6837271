//! File-backed agent workspace.
//!
//! The workspace is a plain directory shared by the agent's tools and the
//! heartbeat:
//! - **TODO.md**: Checklist the agent maintains through the task tools
//! - **HEARTBEAT.md**: Instructions the user leaves for periodic execution
//!
//! Both files are optional. A missing file reads as absent, and TODO.md is
//! created lazily on first write. Access is not locked: concurrent writers
//! race and the last write wins.

mod document;
mod todo;

pub use document::DocType;
pub use todo::{
    CHECKED_MARKERS, PENDING_MARKERS, Priority, TODO_HEADER, TodoItem, TodoList, TodoOutcome,
    contains_pending,
};

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::WorkspaceError;

/// A workspace rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a workspace document.
    pub fn path(&self, doc: DocType) -> PathBuf {
        self.root.join(doc.file_name())
    }

    /// Read a document, returning `None` if it does not exist.
    pub async fn read(&self, doc: DocType) -> Result<Option<String>, WorkspaceError> {
        let path = self.path(doc);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(WorkspaceError::Read { path, source }),
        }
    }

    /// Read a document, treating any failure as absence.
    ///
    /// Used by the heartbeat, which must never fail because a file is
    /// unreadable.
    pub async fn read_lossy(&self, doc: DocType) -> Option<String> {
        match self.read(doc).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(doc = doc.as_str(), error = %e, "Treating unreadable document as absent");
                None
            }
        }
    }

    /// Get the heartbeat checklist (HEARTBEAT.md).
    pub async fn heartbeat_checklist(&self) -> Option<String> {
        self.read_lossy(DocType::Heartbeat).await
    }

    /// Replace a document's content entirely.
    pub async fn write(&self, doc: DocType, content: &str) -> Result<(), WorkspaceError> {
        let path = self.writable_path(doc)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| WorkspaceError::Write { path, source })
    }

    /// Append text to the end of a document, creating it if needed.
    pub async fn append(&self, doc: DocType, text: &str) -> Result<(), WorkspaceError> {
        let path = self.writable_path(doc)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| WorkspaceError::Write {
                path: path.clone(),
                source,
            })?;

        file.write_all(text.as_bytes())
            .await
            .map_err(|source| WorkspaceError::Write {
                path: path.clone(),
                source,
            })?;
        file.flush()
            .await
            .map_err(|source| WorkspaceError::Write { path, source })
    }

    fn writable_path(&self, doc: DocType) -> Result<PathBuf, WorkspaceError> {
        if !doc.is_writable() {
            return Err(WorkspaceError::ReadOnly {
                doc: doc.file_name().to_string(),
            });
        }
        Ok(self.path(doc))
    }
}
