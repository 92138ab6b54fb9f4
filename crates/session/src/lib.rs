//! Session - The editor facade over a loaded presentation
//!
//! Ties the document model, the change tracker and the presentation store
//! together: one [`Editor`] owns a loaded deck, its navigation and selection
//! state, the bounded edit history, and an optional autosave target.

mod editor;
mod error;

pub use editor::*;
pub use error::*;
