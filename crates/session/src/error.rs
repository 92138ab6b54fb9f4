//! Error types for editing sessions

use store::{PptxError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load presentation: {0}")]
    Load(PptxError),

    #[error("Failed to export presentation: {0}")]
    Export(PptxError),

    #[error("No presentation is loaded")]
    NoDocument,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
