//! PPTX Import/Export Module
//!
//! A PPTX file is a ZIP archive of XML parts (Open Packaging Conventions):
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `docProps/core.xml` - Title, author and timestamps
//! - `ppt/presentation.xml` - Slide list and slide size
//! - `ppt/slides/slideN.xml` - Slide content
//! - `ppt/slides/_rels/slideN.xml.rels` - Slide relationships (layout, images)
//! - `ppt/theme/themeN.xml` - Color and font scheme
//! - `ppt/media/` - Embedded images
//!
//! Import decodes slides into the flat document model while keeping the parsed
//! source trees. Export projects model edits back onto those trees and writes
//! every other part through unchanged.

mod api;
mod container;
mod core_properties;
mod error;
mod exporter;
mod media;
mod presentation;
mod reader;
mod relationships;
mod slide_decoder;
mod theme;
mod xml_tree;

pub use api::{export_pptx, import_pptx};
pub use container::Container;
pub use error::{PptxError, PptxResult};
pub use exporter::{
    export, ExportCapabilities, ExportOptions, ExportOutcome, ExportWarning, SkipReason,
    SkippedEdit,
};
pub use media::{data_uri, mime_type_for, MediaResolver};
pub use presentation::{read_presentation_info, PresentationInfo};
pub use reader::{load, read_relationships, LoadedPresentation, PresentationPackage};
pub use relationships::{rels_path_for, resolve_target, Relationship, Relationships, TargetMode};
pub use slide_decoder::{decode_slide, resolve_images};
pub use xml_tree::{decode, encode, NodePath, XmlChild, XmlDeclaration, XmlDocument, XmlNode};

/// Main presentation part
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
/// Core properties part
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
/// Theme part used when the presentation relationships name none
pub const DEFAULT_THEME_PART: &str = "ppt/theme/theme1.xml";

/// XML namespaces used in PPTX files
pub mod namespaces {
    /// PresentationML namespace
    pub const P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    /// DrawingML namespace
    pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Content types namespace
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

/// Relationship types used in PPTX
pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
}
