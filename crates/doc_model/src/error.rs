//! Error types for document model operations

use crate::ElementKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Content does not match element kind {kind:?}")]
    ContentKindMismatch { kind: ElementKind },
}

pub type Result<T> = std::result::Result<T, DocModelError>;
