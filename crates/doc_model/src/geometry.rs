//! Positions and sizes in points, and EMU conversion
//!
//! Presentation parts store lengths in English Metric Units (EMU):
//! 914400 EMU per inch, 72 points per inch.

use serde::{Deserialize, Serialize};

/// EMUs per inch
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert an EMU length to points
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 * POINTS_PER_INCH / EMU_PER_INCH
}

/// Convert a point length to the nearest EMU
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_INCH / POINTS_PER_INCH).round() as i64
}

/// Top-left corner of an element, in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a position from EMU offsets
    pub fn from_emu(x: i64, y: i64) -> Self {
        Self::new(emu_to_points(x), emu_to_points(y))
    }

    /// The position as EMU offsets
    pub fn to_emu(&self) -> (i64, i64) {
        (points_to_emu(self.x), points_to_emu(self.y))
    }
}

/// Extent of an element, in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a size from EMU extents
    pub fn from_emu(cx: i64, cy: i64) -> Self {
        Self::new(emu_to_points(cx), emu_to_points(cy))
    }

    /// The size as EMU extents
    pub fn to_emu(&self) -> (i64, i64) {
        (points_to_emu(self.width), points_to_emu(self.height))
    }
}
