//! Public API for PPTX import/export

use crate::pptx::error::{PptxError, PptxResult};
use crate::pptx::exporter::{export, ExportOptions, ExportOutcome};
use crate::pptx::reader::{load, LoadedPresentation, PresentationPackage};
use doc_model::Document;
use std::path::Path;

/// Import a presentation file from disk
///
/// # Example
///
/// ```ignore
/// use store::pptx::import_pptx;
///
/// let loaded = import_pptx(Path::new("deck.pptx"))?;
/// println!("{} slides", loaded.document.slides.len());
/// ```
pub fn import_pptx(path: &Path) -> PptxResult<LoadedPresentation> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PptxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ))
        } else {
            PptxError::Io(e)
        }
    })?;
    load(&bytes)
}

/// Export a document to a file on disk, creating parent directories
pub fn export_pptx(
    document: &Document,
    package: &PresentationPackage,
    options: &ExportOptions,
    path: &Path,
) -> PptxResult<ExportOutcome> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let outcome = export(document, package, options)?;
    std::fs::write(path, &outcome.bytes)?;
    Ok(outcome)
}
