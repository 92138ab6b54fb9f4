//! Presentation reader - container to document model
//!
//! Only an unreadable archive fails the load. Unparseable slides, relationship
//! parts and metadata are logged and skipped so the rest of the deck opens.

use crate::pptx::container::Container;
use crate::pptx::core_properties::parse_core_properties;
use crate::pptx::error::{PptxError, PptxResult};
use crate::pptx::presentation::read_presentation_info;
use crate::pptx::relationships::{rels_path_for, resolve_relative, Relationships};
use crate::pptx::slide_decoder::decode_slide;
use crate::pptx::theme::parse_theme;
use crate::pptx::xml_tree::{self, XmlDocument};
use crate::pptx::{relationship_types, CORE_PROPERTIES_PART, DEFAULT_THEME_PART, PRESENTATION_PART};
use doc_model::{Document, DocumentMetadata, Element, SourceRef, Theme};
use std::collections::HashMap;

/// Everything from the source container the exporter needs.
///
/// The slide trees and baseline elements are never mutated after load; element
/// back-references point into them.
#[derive(Debug, Clone)]
pub struct PresentationPackage {
    container: Container,
    slide_trees: HashMap<String, XmlDocument>,
    baseline: HashMap<SourceRef, Element>,
    metadata: DocumentMetadata,
}

impl PresentationPackage {
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Original parsed tree of a slide part
    pub fn slide_tree(&self, part_name: &str) -> Option<&XmlDocument> {
        self.slide_trees.get(part_name)
    }

    /// The element as decoded from its source node
    pub fn baseline(&self, source: &SourceRef) -> Option<&Element> {
        self.baseline.get(source)
    }

    /// Source references of all elements decoded from a part
    pub fn baseline_sources<'a>(&'a self, part_name: &'a str) -> impl Iterator<Item = &'a SourceRef> {
        self.baseline
            .keys()
            .filter(move |source| source.part_name == part_name)
    }

    /// Metadata as read from the core properties part
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// The bytes the package was loaded from
    pub fn source_bytes(&self) -> &[u8] {
        self.container.source_bytes()
    }
}

/// A decoded document with its source package
#[derive(Debug, Clone)]
pub struct LoadedPresentation {
    pub document: Document,
    pub package: PresentationPackage,
}

/// Decode a presentation from container bytes
pub fn load(bytes: &[u8]) -> PptxResult<LoadedPresentation> {
    let container = Container::load(bytes)?;

    let metadata = read_metadata(&container);
    let theme = read_theme(&container);
    let info = read_presentation_info(&container);

    let mut document = Document::new();
    document.metadata = metadata.clone();
    document.theme = theme;
    document.slide_size = info.slide_size;

    let mut slide_trees = HashMap::new();
    for (index, part_name) in info.slide_parts.iter().enumerate() {
        let number = index as u32 + 1;
        let Some(bytes) = container.part(part_name) else {
            tracing::warn!("Slide part {} is missing", part_name);
            continue;
        };
        let tree = match xml_tree::decode(part_name, bytes) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Skipping slide {}: {}", number, e);
                continue;
            }
        };

        let rels = read_relationships(&container, part_name);
        if let Some(slide) = decode_slide(part_name, &tree, &rels, &container, number) {
            document.slides.push(slide);
            slide_trees.insert(part_name.clone(), tree);
        }
    }

    let baseline = document
        .slides
        .iter()
        .flat_map(|slide| slide.elements.iter())
        .filter_map(|element| {
            let source = element.source.clone()?;
            Some((source, element.clone()))
        })
        .collect();

    tracing::info!(
        "Loaded presentation: {} of {} slides, {} elements",
        document.slides.len(),
        info.slide_parts.len(),
        document.element_count()
    );

    Ok(LoadedPresentation {
        document,
        package: PresentationPackage {
            container,
            slide_trees,
            baseline,
            metadata,
        },
    })
}

/// Relationships of a part; absent or unreadable parts yield an empty set
pub fn read_relationships(container: &Container, part_name: &str) -> Relationships {
    let rels_path = rels_path_for(part_name);
    let Some(bytes) = container.part(&rels_path) else {
        return Relationships::new();
    };

    let parsed = std::str::from_utf8(bytes)
        .map_err(|e| PptxError::malformed(rels_path.as_str(), e))
        .and_then(|content| Relationships::parse(&rels_path, content));
    match parsed {
        Ok(rels) => rels,
        Err(e) => {
            tracing::warn!("Ignoring relationships of {}: {}", part_name, e);
            Relationships::new()
        }
    }
}

fn read_metadata(container: &Container) -> DocumentMetadata {
    let Some(bytes) = container.part(CORE_PROPERTIES_PART) else {
        return DocumentMetadata::default();
    };
    parse_core_properties(CORE_PROPERTIES_PART, bytes).unwrap_or_else(|e| {
        tracing::warn!("Failed to read document properties: {}", e);
        DocumentMetadata::default()
    })
}

fn read_theme(container: &Container) -> Option<Theme> {
    let theme_part = read_relationships(container, PRESENTATION_PART)
        .get_by_type(relationship_types::THEME)
        .map(|rel| resolve_relative(PRESENTATION_PART, &rel.target))
        .unwrap_or_else(|| DEFAULT_THEME_PART.to_string());

    let bytes = container.part(&theme_part)?;
    match parse_theme(&theme_part, bytes) {
        Ok(theme) => Some(theme),
        Err(e) => {
            tracing::warn!("Failed to read theme: {}", e);
            None
        }
    }
}
