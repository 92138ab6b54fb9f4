//! Error types for PPTX import/export

use thiserror::Error;

/// Errors that can occur while reading or writing a presentation container
#[derive(Debug, Error)]
pub enum PptxError {
    /// The byte stream is not a readable zip archive
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// A part is not well-formed XML
    #[error("Malformed XML in {part}: {message}")]
    MalformedXml { part: String, message: String },

    /// A relationship id or target could not be resolved
    #[error("Missing relationship {rel_id} in {part}")]
    MissingRelationship { part: String, rel_id: String },

    /// A required part is absent from the container
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// Serializing the output archive failed
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PptxError {
    pub(crate) fn malformed(part: impl Into<String>, message: impl ToString) -> Self {
        PptxError::MalformedXml {
            part: part.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for PPTX operations
pub type PptxResult<T> = std::result::Result<T, PptxError>;
