//! Element mutation API
//!
//! Every call targets an element on a given slide. Missing slides or elements
//! make the call a silent no-op (`None`). A successful call snapshots the
//! element, applies the change, and returns exactly one [`ChangeRecord`] for
//! the caller to hand to its change tracker.

use crate::{
    ChangeRecord, Document, Element, ElementContent, ElementId, ElementKind, ElementStyle, Position,
    Size, SlideId, StylePatch,
};

impl Document {
    /// Replace the text of a text-bearing element
    pub fn update_text(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
        text: &str,
    ) -> Option<ChangeRecord> {
        self.update_element(slide_id, element_id, "Updated text", |element| {
            element.content.set_text(text)
        })
    }

    pub fn update_element_position(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
        position: Position,
    ) -> Option<ChangeRecord> {
        self.update_element(slide_id, element_id, "Moved element", |element| {
            element.position = position;
            true
        })
    }

    pub fn update_element_size(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
        size: Size,
    ) -> Option<ChangeRecord> {
        self.update_element(slide_id, element_id, "Resized element", |element| {
            element.size = size;
            true
        })
    }

    /// Shallow-merge a partial style into the element's style
    pub fn update_element_style(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
        patch: &StylePatch,
    ) -> Option<ChangeRecord> {
        self.update_element(slide_id, element_id, "Updated style", |element| {
            let merged = element.style.clone().unwrap_or_default().merge(patch);
            element.style = Some(merged);
            true
        })
    }

    /// Add a new element on top of the slide's existing elements.
    ///
    /// `content` defaults to empty content of `kind`; content of another kind
    /// is replaced by empty content. The new element id is returned through
    /// the record's `element_id()`.
    pub fn add_element(
        &mut self,
        slide_id: SlideId,
        kind: ElementKind,
        position: Position,
        size: Size,
        content: Option<ElementContent>,
    ) -> Option<ChangeRecord> {
        self.add_styled_element(slide_id, kind, position, size, content, None)
    }

    /// [`Document::add_element`] with an initial style
    pub fn add_styled_element(
        &mut self,
        slide_id: SlideId,
        kind: ElementKind,
        position: Position,
        size: Size,
        content: Option<ElementContent>,
        style: Option<ElementStyle>,
    ) -> Option<ChangeRecord> {
        let content = match content {
            Some(content) if content.kind() == kind => content,
            Some(content) => {
                tracing::warn!(
                    "Content of kind {:?} does not match {:?}, using empty content",
                    content.kind(),
                    kind
                );
                ElementContent::empty(kind)
            }
            None => ElementContent::empty(kind),
        };

        let mut id = ElementId::new();
        while self.contains_element(id) {
            id = ElementId::new();
        }

        let slide = self.slide_mut(slide_id)?;
        let element = Element {
            id,
            kind,
            position,
            size,
            content,
            style,
            z_order: slide.next_z_order(),
            name: None,
            source: None,
        };
        slide.elements.push(element.clone());

        Some(ChangeRecord::add(
            slide_id,
            element,
            format!("Added {} element", kind.as_str()),
        ))
    }

    pub fn delete_element(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
    ) -> Option<ChangeRecord> {
        let slide = self.slide_mut(slide_id)?;
        let removed = slide.remove_element(element_id)?;
        Some(ChangeRecord::delete(slide_id, removed, "Deleted element"))
    }

    fn update_element<F>(
        &mut self,
        slide_id: SlideId,
        element_id: ElementId,
        description: &str,
        apply: F,
    ) -> Option<ChangeRecord>
    where
        F: FnOnce(&mut Element) -> bool,
    {
        let element = self.slide_mut(slide_id)?.element_mut(element_id)?;
        let previous = element.clone();
        if !apply(&mut *element) {
            tracing::debug!("{} skipped for {:?} element {}", description, element.kind, element_id);
            return None;
        }
        Some(ChangeRecord::update(
            slide_id,
            previous,
            element.clone(),
            description,
        ))
    }
}
