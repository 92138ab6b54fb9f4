//! Document Model - Presentation slides, elements, and change records
//!
//! This crate provides the flat, editable model of a presentation: slides
//! holding positioned elements, document metadata and theme, plus the
//! tolerant mutation API that produces invertible change records.

mod change;
mod document;
mod element;
mod error;
mod geometry;
mod mutation;
mod node_id;
mod slide;
pub mod style;

pub use change::*;
pub use document::*;
pub use element::*;
pub use error::*;
pub use geometry::*;
pub use node_id::*;
pub use slide::*;
pub use style::*;
