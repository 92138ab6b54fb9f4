//! Error types for applying and reverting changes

use doc_model::{ChangeKind, ElementId, SlideId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Slide not found: {0}")]
    SlideNotFound(SlideId),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("{kind} change for element {element_id} has no snapshot to restore")]
    MissingSnapshot { kind: ChangeKind, element_id: ElementId },
}

pub type Result<T> = std::result::Result<T, EditError>;
