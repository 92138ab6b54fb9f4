//! Element styling - font, color, alignment, fill, and border
//!
//! Every property is optional. A `StylePatch` is merged shallowly on top of an
//! element's style: properties present in the patch override, absent ones keep
//! their current value.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment within an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// Parse a DrawingML `algn` attribute value
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" | "dist" => Some(Self::Justify),
            _ => None,
        }
    }

    /// The DrawingML `algn` attribute value
    pub fn to_ooxml(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }
}

/// Outline of a shape
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Border {
    /// Line color (hex RGB, e.g. "1F4E79")
    pub color: Option<String>,
    /// Line width in points
    pub width: Option<f32>,
}

/// Visual style of an element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Font family name
    pub font_family: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Text color (hex RGB)
    pub color: Option<String>,
    pub alignment: Option<TextAlign>,
    /// Shape fill color (hex RGB)
    pub fill: Option<String>,
    pub border: Option<Border>,
}

/// A partial style used by style updates
pub type StylePatch = ElementStyle;

impl ElementStyle {
    /// Create new empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another set of properties on top of this one
    /// Properties from `other` override properties from `self` when present
    pub fn merge(&self, other: &ElementStyle) -> ElementStyle {
        ElementStyle {
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            color: other.color.clone().or_else(|| self.color.clone()),
            alignment: other.alignment.or(self.alignment),
            fill: other.fill.clone().or_else(|| self.fill.clone()),
            border: other.border.clone().or_else(|| self.border.clone()),
        }
    }

    /// Check if all properties are None
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.color.is_none()
            && self.alignment.is_none()
            && self.fill.is_none()
            && self.border.is_none()
    }

    pub fn with_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.font_family = Some(family.into());
        self.font_size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlign) -> Self {
        self.alignment = Some(alignment);
        self
    }
}
