//! Slide elements - text boxes, pictures, shapes, and unsupported graphic frames

use crate::{DocModelError, ElementId, ElementStyle, Position, Result, Size};
use serde::{Deserialize, Serialize};

/// The type tag of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Shape,
    /// Decoded as a placeholder only
    Chart,
    /// Decoded as a placeholder only
    Table,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Shape => "shape",
            ElementKind::Chart => "chart",
            ElementKind::Table => "table",
        }
    }

    /// Whether the element carries editable text
    pub fn is_text_bearing(&self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::Shape)
    }
}

/// Text frame content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    /// Paragraphs joined with '\n'
    pub text: String,
    /// Placeholder type (e.g. "title", "body") when the text box is a layout placeholder
    pub placeholder: Option<String>,
}

/// Resolution state of an image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageResolution {
    /// Not yet looked up in the slide relationships
    #[default]
    Pending,
    /// Media bytes were found and attached
    Resolved,
    /// Relationship or media part not found; the element is kept as a placeholder
    Missing,
}

/// Picture content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageContent {
    /// Relationship id of the blip (e.g. "rId2")
    pub rel_id: Option<String>,
    /// Resolved media part path inside the container
    pub media_path: Option<String>,
    /// Inline `data:` URI of the media bytes
    pub data_uri: Option<String>,
    pub mime_type: Option<String>,
    /// Alternative text (`cNvPr@descr`)
    pub alt_text: Option<String>,
    pub resolution: ImageResolution,
}

impl ImageContent {
    pub fn is_resolved(&self) -> bool {
        self.resolution == ImageResolution::Resolved
    }
}

/// Geometric shape content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    /// Preset geometry name (e.g. "rect", "ellipse")
    pub geometry: String,
    pub text: Option<String>,
}

impl Default for ShapeContent {
    fn default() -> Self {
        Self {
            geometry: "rect".to_string(),
            text: None,
        }
    }
}

/// Content of a graphic frame we do not decode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnsupportedContent {
    /// `a:graphicData@uri`
    pub graphic_uri: Option<String>,
}

/// Type-specific payload of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementContent {
    Text(TextContent),
    Image(ImageContent),
    Shape(ShapeContent),
    Chart(UnsupportedContent),
    Table(UnsupportedContent),
}

impl ElementContent {
    /// Plain text content
    pub fn text(text: impl Into<String>) -> Self {
        ElementContent::Text(TextContent {
            text: text.into(),
            placeholder: None,
        })
    }

    /// Empty content for a kind
    pub fn empty(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Text => ElementContent::Text(TextContent::default()),
            ElementKind::Image => ElementContent::Image(ImageContent::default()),
            ElementKind::Shape => ElementContent::Shape(ShapeContent::default()),
            ElementKind::Chart => ElementContent::Chart(UnsupportedContent::default()),
            ElementKind::Table => ElementContent::Table(UnsupportedContent::default()),
        }
    }

    /// The kind this content belongs to
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementContent::Text(_) => ElementKind::Text,
            ElementContent::Image(_) => ElementKind::Image,
            ElementContent::Shape(_) => ElementKind::Shape,
            ElementContent::Chart(_) => ElementKind::Chart,
            ElementContent::Table(_) => ElementKind::Table,
        }
    }

    /// Editable text, if this content carries any
    pub fn text_value(&self) -> Option<&str> {
        match self {
            ElementContent::Text(t) => Some(t.text.as_str()),
            ElementContent::Shape(s) => s.text.as_deref(),
            _ => None,
        }
    }

    /// Replace the text. Returns false for content kinds without text.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            ElementContent::Text(t) => {
                t.text = text.into();
                true
            }
            ElementContent::Shape(s) => {
                s.text = Some(text.into());
                true
            }
            _ => false,
        }
    }

    pub fn as_image(&self) -> Option<&ImageContent> {
        match self {
            ElementContent::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageContent> {
        match self {
            ElementContent::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Non-owning back-reference from an element to the XML subtree it was decoded from.
///
/// `node_path` is the child-index path from the root element of `part_name`'s
/// original tree. The tree itself is owned by the loaded package and never
/// mutated, so the path stays valid for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub part_name: String,
    pub node_path: Vec<usize>,
}

impl SourceRef {
    pub fn new(part_name: impl Into<String>, node_path: Vec<usize>) -> Self {
        Self {
            part_name: part_name.into(),
            node_path,
        }
    }
}

/// A positioned element on a slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub position: Position,
    pub size: Size,
    pub content: ElementContent,
    pub style: Option<ElementStyle>,
    /// Paint order within the slide; later is drawn on top
    pub z_order: u32,
    /// Display name from the source (`cNvPr@name`)
    pub name: Option<String>,
    pub source: Option<SourceRef>,
}

impl Element {
    /// Create a new element with a fresh id.
    ///
    /// Fails when `content` belongs to a different kind.
    pub fn new(
        kind: ElementKind,
        position: Position,
        size: Size,
        content: ElementContent,
    ) -> Result<Self> {
        if content.kind() != kind {
            return Err(DocModelError::ContentKindMismatch { kind });
        }
        Ok(Self {
            id: ElementId::new(),
            kind,
            position,
            size,
            content,
            style: None,
            z_order: 0,
            name: None,
            source: None,
        })
    }

    /// Create a text element
    pub fn text(text: impl Into<String>, position: Position, size: Size) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Text,
            position,
            size,
            content: ElementContent::text(text),
            style: None,
            z_order: 0,
            name: None,
            source: None,
        }
    }

    pub fn with_z_order(mut self, z_order: u32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Editable text, if any
    pub fn text_value(&self) -> Option<&str> {
        self.content.text_value()
    }
}
