//! Slides and their backgrounds

use crate::{Element, ElementId, SlideId};
use serde::{Deserialize, Serialize};

/// Slide background fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    /// Solid color (hex RGB)
    Solid { color: String },
    /// Picture fill referenced by relationship id
    Image { rel_id: String },
}

/// A single slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    /// 1-based position in the original presentation order
    pub number: u32,
    /// Elements in sequence order (not necessarily paint order after edits)
    pub elements: Vec<Element>,
    pub background: Option<Background>,
    /// Layout part the slide is based on
    pub layout: Option<String>,
    /// Container part this slide was decoded from
    pub part_name: String,
    /// `p:cSld@name`
    pub name: Option<String>,
}

impl Slide {
    /// Create an empty slide for a part
    pub fn new(number: u32, part_name: impl Into<String>) -> Self {
        Self {
            id: SlideId::new(),
            number,
            elements: Vec::new(),
            background: None,
            layout: None,
            part_name: part_name.into(),
            name: None,
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Remove an element by id, returning it
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        self.element_index(id).map(|index| self.elements.remove(index))
    }

    /// The z-order a newly added element receives
    pub fn next_z_order(&self) -> u32 {
        self.elements
            .iter()
            .map(|e| e.z_order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Elements sorted by paint order (bottom first)
    pub fn elements_in_paint_order(&self) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.iter().collect();
        elements.sort_by_key(|e| e.z_order);
        elements
    }

    /// Concatenated text of all text-bearing elements, in paint order
    pub fn text(&self) -> String {
        self.elements_in_paint_order()
            .into_iter()
            .filter_map(|e| e.text_value())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
