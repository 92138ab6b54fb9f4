//! Store - Presentation container I/O, settings, and autosave
//!
//! This crate decodes presentation containers into the document model,
//! re-encodes edits back into the original container, and handles editor
//! settings, autosave snapshots, and file I/O.

mod autosave;
mod error;
mod file_io;
mod settings;
pub mod pptx;

pub use autosave::*;
pub use error::*;
pub use file_io::*;
pub use settings::*;

pub use pptx::{
    export_pptx, import_pptx, ExportOptions, ExportOutcome, LoadedPresentation, PptxError,
    PptxResult, PresentationPackage,
};
