//! Document root, metadata, and theme

use crate::{Element, ElementId, Size, Slide, SlideId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document metadata from the core properties part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    /// W3CDTF timestamp
    pub created: Option<String>,
    /// W3CDTF timestamp
    pub modified: Option<String>,
}

/// Heading and body font pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontScheme {
    pub major: Option<String>,
    pub minor: Option<String>,
}

/// Theme palette and fonts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: Option<String>,
    /// Scheme slot (dk1, lt1, accent1, ...) to hex RGB
    pub colors: BTreeMap<String, String>,
    pub fonts: FontScheme,
}

impl Theme {
    pub fn color(&self, slot: &str) -> Option<&str> {
        self.colors.get(slot).map(String::as_str)
    }
}

/// Default slide size (4:3, 10in x 7.5in) in points
pub const DEFAULT_SLIDE_SIZE: Size = Size {
    width: 720.0,
    height: 540.0,
};

/// A decoded presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub slides: Vec<Slide>,
    pub metadata: DocumentMetadata,
    pub theme: Option<Theme>,
    pub slide_size: Size,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            metadata: DocumentMetadata::default(),
            theme: None,
            slide_size: DEFAULT_SLIDE_SIZE,
        }
    }

    pub fn slide(&self, id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.id == id)
    }

    /// Find a slide by its 1-based number
    pub fn slide_by_number(&self, number: u32) -> Option<&Slide> {
        self.slides.iter().find(|s| s.number == number)
    }

    /// Find an element anywhere in the document
    pub fn find_element(&self, id: ElementId) -> Option<(&Slide, &Element)> {
        self.slides
            .iter()
            .find_map(|slide| slide.element(id).map(|element| (slide, element)))
    }

    /// Whether any slide holds an element with this id
    pub fn contains_element(&self, id: ElementId) -> bool {
        self.find_element(id).is_some()
    }

    pub fn element_count(&self) -> usize {
        self.slides.iter().map(|s| s.elements.len()).sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
