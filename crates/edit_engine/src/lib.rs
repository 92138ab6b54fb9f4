//! Edit Engine - Change tracking and undo/redo
//!
//! This crate keeps the bounded change log for an editing session and knows
//! how to apply and revert individual change records against a document.

mod executor;
mod undo;
mod error;

pub use executor::*;
pub use undo::*;
pub use error::*;
