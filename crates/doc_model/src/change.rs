//! Change records - immutable, invertible descriptions of one mutation

use crate::{ChangeId, Element, ElementId, SlideId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a change did to its element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded mutation.
///
/// Snapshots are whole-element copies: `previous_state` is `None` for adds,
/// `new_state` is `None` for deletes. Records are never mutated after creation,
/// so all fields are private and exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    id: ChangeId,
    timestamp: DateTime<Utc>,
    kind: ChangeKind,
    element_id: ElementId,
    slide_id: SlideId,
    previous_state: Option<Element>,
    new_state: Option<Element>,
    description: String,
}

impl ChangeRecord {
    /// Record an element addition
    pub fn add(slide_id: SlideId, added: Element, description: impl Into<String>) -> Self {
        Self::build(
            ChangeKind::Add,
            added.id,
            slide_id,
            None,
            Some(added),
            description,
        )
    }

    /// Record an in-place update
    pub fn update(
        slide_id: SlideId,
        previous: Element,
        updated: Element,
        description: impl Into<String>,
    ) -> Self {
        Self::build(
            ChangeKind::Update,
            previous.id,
            slide_id,
            Some(previous),
            Some(updated),
            description,
        )
    }

    /// Record an element deletion
    pub fn delete(slide_id: SlideId, removed: Element, description: impl Into<String>) -> Self {
        Self::build(
            ChangeKind::Delete,
            removed.id,
            slide_id,
            Some(removed),
            None,
            description,
        )
    }

    fn build(
        kind: ChangeKind,
        element_id: ElementId,
        slide_id: SlideId,
        previous_state: Option<Element>,
        new_state: Option<Element>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ChangeId::new(),
            timestamp: Utc::now(),
            kind,
            element_id,
            slide_id,
            previous_state,
            new_state,
            description: description.into(),
        }
    }

    pub fn id(&self) -> ChangeId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    pub fn slide_id(&self) -> SlideId {
        self.slide_id
    }

    pub fn previous_state(&self) -> Option<&Element> {
        self.previous_state.as_ref()
    }

    pub fn new_state(&self) -> Option<&Element> {
        self.new_state.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
