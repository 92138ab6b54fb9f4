//! Editor state for a single open presentation
//!
//! The editor owns the loaded document together with its source package, the
//! slide and element selection, and the change tracker. Every successful edit
//! records exactly one change; undo and redo replay those records against the
//! document. When autosave is enabled and a snapshot store is attached, the
//! session is snapshotted after each change.

use crate::{Result, SessionError};
use doc_model::{
    ChangeRecord, Document, ElementContent, ElementId, ElementKind, ElementStyle, Position, Size,
    Slide, SlideId, StylePatch,
};
use edit_engine::{apply_change, revert_change, ChangeSummary, ChangeTracker};
use store::pptx::{export, load, ExportOutcome, PresentationPackage};
use store::{
    read_presentation_sync, write_presentation_sync, AutosaveSnapshot, EditorSettings,
    SnapshotStore,
};
use std::path::Path;

/// A loaded document and the package it was decoded from
struct OpenPresentation {
    document: Document,
    package: PresentationPackage,
}

/// Editing session over one presentation
pub struct Editor {
    settings: EditorSettings,
    presentation: Option<OpenPresentation>,
    tracker: ChangeTracker,
    current_slide: Option<SlideId>,
    selected_element: Option<ElementId>,
    /// Whether there are edits since the last load or save
    dirty: bool,
    snapshots: Option<Box<dyn SnapshotStore>>,
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        let tracker = ChangeTracker::new(settings.history.capacity);
        Self {
            settings,
            presentation: None,
            tracker,
            current_slide: None,
            selected_element: None,
            dirty: false,
            snapshots: None,
        }
    }

    /// Attach a store that receives autosave snapshots
    pub fn with_snapshot_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.snapshots = Some(Box::new(store));
        self
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Load a presentation from container bytes, replacing any open one.
    ///
    /// History and selection are reset and the first slide becomes current.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let loaded = load(bytes).map_err(SessionError::Load)?;
        self.open(loaded.document, loaded.package);
        self.tracker = ChangeTracker::new(self.settings.history.capacity);
        Ok(())
    }

    /// Load a presentation from a file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = read_presentation_sync(path)?;
        self.load(&bytes)
    }

    fn open(&mut self, document: Document, package: PresentationPackage) {
        self.current_slide = document.slides.first().map(|s| s.id);
        self.selected_element = None;
        self.dirty = false;
        self.presentation = Some(OpenPresentation { document, package });
    }

    pub fn document(&self) -> Option<&Document> {
        self.presentation.as_ref().map(|p| &p.document)
    }

    pub fn is_loaded(&self) -> bool {
        self.presentation.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // Navigation

    /// Slides in presentation order; empty when nothing is loaded
    pub fn slides(&self) -> &[Slide] {
        self.document().map(|d| d.slides.as_slice()).unwrap_or_default()
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        let id = self.current_slide?;
        self.document()?.slide(id)
    }

    /// Make `slide_id` current. Changing slides clears the element selection.
    pub fn select_slide(&mut self, slide_id: SlideId) -> bool {
        if self.document().and_then(|d| d.slide(slide_id)).is_none() {
            return false;
        }
        if self.current_slide != Some(slide_id) {
            self.selected_element = None;
        }
        self.current_slide = Some(slide_id);
        true
    }

    /// Make the slide with the given 1-based number current
    pub fn select_slide_number(&mut self, number: u32) -> bool {
        match self.document().and_then(|d| d.slide_by_number(number)) {
            Some(slide) => {
                let id = slide.id;
                self.select_slide(id)
            }
            None => false,
        }
    }

    /// Advance to the next slide. Stays put on the last slide.
    pub fn next_slide(&mut self) -> Option<&Slide> {
        let index = self.current_index()?;
        let id = self.slides().get(index + 1)?.id;
        self.select_slide(id);
        self.current_slide()
    }

    /// Go back to the previous slide. Stays put on the first slide.
    pub fn previous_slide(&mut self) -> Option<&Slide> {
        let index = self.current_index()?.checked_sub(1)?;
        let id = self.slides().get(index)?.id;
        self.select_slide(id);
        self.current_slide()
    }

    fn current_index(&self) -> Option<usize> {
        let id = self.current_slide?;
        self.slides().iter().position(|s| s.id == id)
    }

    // Selection

    /// Select an element on the current slide
    pub fn select_element(&mut self, element_id: ElementId) -> bool {
        let exists = self
            .current_slide()
            .is_some_and(|slide| slide.element(element_id).is_some());
        if exists {
            self.selected_element = Some(element_id);
        }
        exists
    }

    pub fn selected_element(&self) -> Option<ElementId> {
        self.selected_element
    }

    pub fn clear_selection(&mut self) {
        self.selected_element = None;
    }

    /// Drop a selection whose element is gone from the current slide
    fn validate_selection(&mut self) {
        if let Some(id) = self.selected_element {
            let present = self
                .current_slide()
                .is_some_and(|slide| slide.element(id).is_some());
            if !present {
                self.selected_element = None;
            }
        }
    }

    // Element editing on the current slide

    pub fn update_text(&mut self, element_id: ElementId, text: &str) -> bool {
        self.edit(|document, slide_id| document.update_text(slide_id, element_id, text))
            .is_some()
    }

    pub fn update_element_position(&mut self, element_id: ElementId, position: Position) -> bool {
        self.edit(|document, slide_id| {
            document.update_element_position(slide_id, element_id, position)
        })
        .is_some()
    }

    pub fn update_element_size(&mut self, element_id: ElementId, size: Size) -> bool {
        self.edit(|document, slide_id| document.update_element_size(slide_id, element_id, size))
            .is_some()
    }

    /// Merge `patch` into the element's style
    pub fn update_element_style(&mut self, element_id: ElementId, patch: &StylePatch) -> bool {
        self.edit(|document, slide_id| document.update_element_style(slide_id, element_id, patch))
            .is_some()
    }

    /// Add an element to the current slide and select it
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        position: Position,
        size: Size,
        content: Option<ElementContent>,
    ) -> Option<ElementId> {
        let id = self.edit(|document, slide_id| {
            document.add_element(slide_id, kind, position, size, content)
        })?;
        self.selected_element = Some(id);
        Some(id)
    }

    /// Add a text box sized and styled from the new-element defaults
    pub fn add_text_box(&mut self, position: Position, text: &str) -> Option<ElementId> {
        let defaults = &self.settings.new_elements;
        let size = Size::new(defaults.width, defaults.height);
        let style = ElementStyle::new()
            .with_font(defaults.font_family.clone(), defaults.font_size)
            .with_color(defaults.color.clone());
        let content = ElementContent::text(text);

        let id = self.edit(|document, slide_id| {
            document.add_styled_element(
                slide_id,
                ElementKind::Text,
                position,
                size,
                Some(content),
                Some(style),
            )
        })?;
        self.selected_element = Some(id);
        Some(id)
    }

    /// Delete an element from the current slide, deselecting it if selected
    pub fn delete_element(&mut self, element_id: ElementId) -> bool {
        let deleted = self
            .edit(|document, slide_id| document.delete_element(slide_id, element_id))
            .is_some();
        if deleted && self.selected_element == Some(element_id) {
            self.selected_element = None;
        }
        deleted
    }

    /// Run a mutation against the current slide and record its change
    fn edit<F>(&mut self, mutate: F) -> Option<ElementId>
    where
        F: FnOnce(&mut Document, SlideId) -> Option<ChangeRecord>,
    {
        let slide_id = self.current_slide?;
        let presentation = self.presentation.as_mut()?;
        let change = mutate(&mut presentation.document, slide_id)?;
        let element_id = change.element_id();

        tracing::debug!("{}", change.description());
        self.tracker.record(change);
        self.dirty = true;
        self.autosave();
        Some(element_id)
    }

    // History

    /// Revert the most recent applied change.
    ///
    /// Returns `false` when there is nothing to undo or the change no longer
    /// applies to the document; the cursor only moves on success.
    pub fn undo(&mut self) -> bool {
        let Some(presentation) = self.presentation.as_mut() else {
            return false;
        };
        let Some(change) = self.tracker.peek_undo() else {
            return false;
        };
        if let Err(e) = revert_change(&mut presentation.document, change) {
            tracing::warn!("Failed to undo '{}': {}", change.description(), e);
            return false;
        }
        self.tracker.undo();
        self.after_history_step();
        true
    }

    /// Re-apply the most recently undone change
    pub fn redo(&mut self) -> bool {
        let Some(presentation) = self.presentation.as_mut() else {
            return false;
        };
        let Some(change) = self.tracker.peek_redo() else {
            return false;
        };
        if let Err(e) = apply_change(&mut presentation.document, change) {
            tracing::warn!("Failed to redo '{}': {}", change.description(), e);
            return false;
        }
        self.tracker.redo();
        self.after_history_step();
        true
    }

    fn after_history_step(&mut self) {
        self.validate_selection();
        self.dirty = true;
        self.autosave();
    }

    /// Revert every applied change, newest first, and clear the history.
    ///
    /// Returns the number of changes reverted.
    pub fn revert_all(&mut self) -> usize {
        let Some(presentation) = self.presentation.as_mut() else {
            return 0;
        };
        let applied: Vec<&ChangeRecord> = self.tracker.applied().collect();
        let count = applied.len();
        for change in applied.into_iter().rev() {
            if let Err(e) = revert_change(&mut presentation.document, change) {
                tracing::warn!("Failed to revert '{}': {}", change.description(), e);
            }
        }
        self.tracker.clear();
        self.after_history_step();
        count
    }

    /// Revert the applied changes made to one slide, newest first.
    ///
    /// Those changes leave the history and the redo branch is discarded;
    /// changes to other slides stay undoable.
    pub fn revert_slide(&mut self, slide_id: SlideId) -> usize {
        let Some(presentation) = self.presentation.as_mut() else {
            return 0;
        };
        let taken = self.tracker.take_slide_changes(slide_id);
        for change in taken.iter().rev() {
            if let Err(e) = revert_change(&mut presentation.document, change) {
                tracing::warn!("Failed to revert '{}': {}", change.description(), e);
            }
        }
        if !taken.is_empty() {
            self.after_history_step();
        }
        taken.len()
    }

    pub fn can_undo(&self) -> bool {
        self.tracker.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.tracker.can_redo()
    }

    /// Applied changes, oldest first
    pub fn change_history(&self) -> Vec<&ChangeRecord> {
        self.tracker.applied().collect()
    }

    pub fn change_summary(&self) -> ChangeSummary {
        self.tracker.summary()
    }

    // Export

    /// Re-encode the document into a copy of the source container
    pub fn export(&self) -> Result<Vec<u8>> {
        Ok(self.export_with_outcome()?.bytes)
    }

    /// Like [`Editor::export`], also reporting warnings and skipped edits
    pub fn export_with_outcome(&self) -> Result<ExportOutcome> {
        let presentation = self.presentation.as_ref().ok_or(SessionError::NoDocument)?;
        export(
            &presentation.document,
            &presentation.package,
            &self.settings.export,
        )
        .map_err(SessionError::Export)
    }

    /// Export to a file and mark the session clean
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<ExportOutcome> {
        let outcome = self.export_with_outcome()?;
        write_presentation_sync(path, &outcome.bytes)?;
        self.dirty = false;
        Ok(outcome)
    }

    // Autosave

    fn autosave(&self) {
        if !self.settings.autosave.enabled {
            return;
        }
        let (Some(store), Some(presentation)) = (self.snapshots.as_deref(), &self.presentation)
        else {
            return;
        };

        let snapshot = AutosaveSnapshot::new(
            presentation.document.clone(),
            self.tracker.position(),
            self.tracker.records().cloned().collect(),
            presentation.package.source_bytes().to_vec(),
        );
        if let Err(e) = store.save(&snapshot) {
            tracing::warn!("Autosave failed: {}", e);
        }
    }

    /// Rebuild the session from the last autosave snapshot.
    ///
    /// Returns `false` when there is no store or no snapshot.
    pub fn restore_autosave(&mut self) -> Result<bool> {
        let Some(store) = self.snapshots.as_deref() else {
            return Ok(false);
        };
        let Some(snapshot) = store.load()? else {
            return Ok(false);
        };

        let loaded = load(&snapshot.source).map_err(SessionError::Load)?;
        self.open(snapshot.document, loaded.package);
        self.tracker = ChangeTracker::from_parts(
            snapshot.changes,
            snapshot.history_position,
            self.settings.history.capacity,
        );
        self.dirty = self.tracker.can_undo();

        tracing::info!(
            "Restored autosave from {} with {} changes",
            snapshot.saved_at,
            self.tracker.len()
        );
        Ok(true)
    }

    /// Remove the stored autosave snapshot
    pub fn discard_autosave(&self) -> Result<()> {
        if let Some(store) = self.snapshots.as_deref() {
            store.clear()?;
        }
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
