//! Applying and reverting change records against a document

use crate::{EditError, Result};
use doc_model::{ChangeKind, ChangeRecord, Document, Element, Slide};

/// Re-apply a recorded change.
///
/// - add: the new-state snapshot is pushed onto the slide
/// - update: the new-state snapshot replaces the element
/// - delete: the element is removed
pub fn apply_change(document: &mut Document, change: &ChangeRecord) -> Result<()> {
    let slide = slide_for(document, change)?;
    match change.kind() {
        ChangeKind::Add => insert_or_replace(slide, snapshot(change, change.new_state())?),
        ChangeKind::Update => replace(slide, snapshot(change, change.new_state())?),
        ChangeKind::Delete => remove(slide, change),
    }
}

/// Undo a recorded change.
///
/// A reverted delete re-inserts the element at the end of the element
/// sequence; its z-order comes from the snapshot.
pub fn revert_change(document: &mut Document, change: &ChangeRecord) -> Result<()> {
    let slide = slide_for(document, change)?;
    match change.kind() {
        ChangeKind::Add => remove(slide, change),
        ChangeKind::Update => replace(slide, snapshot(change, change.previous_state())?),
        ChangeKind::Delete => insert_or_replace(slide, snapshot(change, change.previous_state())?),
    }
}

fn slide_for<'a>(document: &'a mut Document, change: &ChangeRecord) -> Result<&'a mut Slide> {
    document
        .slide_mut(change.slide_id())
        .ok_or(EditError::SlideNotFound(change.slide_id()))
}

fn snapshot<'a>(change: &ChangeRecord, state: Option<&'a Element>) -> Result<&'a Element> {
    state.ok_or(EditError::MissingSnapshot {
        kind: change.kind(),
        element_id: change.element_id(),
    })
}

fn replace(slide: &mut Slide, element: &Element) -> Result<()> {
    let existing = slide
        .element_mut(element.id)
        .ok_or(EditError::ElementNotFound(element.id))?;
    *existing = element.clone();
    Ok(())
}

fn insert_or_replace(slide: &mut Slide, element: &Element) -> Result<()> {
    match slide.element_mut(element.id) {
        Some(existing) => *existing = element.clone(),
        None => slide.elements.push(element.clone()),
    }
    Ok(())
}

fn remove(slide: &mut Slide, change: &ChangeRecord) -> Result<()> {
    slide
        .remove_element(change.element_id())
        .map(|_| ())
        .ok_or(EditError::ElementNotFound(change.element_id()))
}
