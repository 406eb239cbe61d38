//! Drag engine errors.

use thiserror::Error;

use crate::task::TaskId;

/// Errors surfaced by the drag engine and its page seam.
#[derive(Debug, Error)]
pub enum DragError {
    /// The recognised distance was zero; nothing to drag.
    #[error("Target distance is zero")]
    ZeroDistance,

    /// Another task holds the slide lock.
    #[error("Slide lock is held by task {0}")]
    LockBusy(TaskId),

    /// An element the task depends on is no longer on the page.
    #[error("Element gone: {0}")]
    ElementGone(String),

    /// Any other failure reported by the page backend.
    #[error("Page error: {0}")]
    Page(String),
}

impl DragError {
    /// Whether the error means the dispatch target disappeared mid-drag.
    pub fn is_element_gone(&self) -> bool {
        matches!(self, DragError::ElementGone(_))
    }
}
