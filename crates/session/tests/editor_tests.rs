//! Integration tests for the editing session
//!
//! Each test loads the in-memory fixture deck into an [`Editor`] and drives it
//! through the public API only.

#[path = "../../store/tests/common/mod.rs"]
mod common;

use common::*;
use doc_model::{ChangeKind, ElementId, ElementKind, Position, Size, StylePatch};
use session::Editor;
use std::sync::Arc;
use store::pptx::SkipReason;
use store::{EditorSettings, FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use tempfile::TempDir;

fn editor_with(settings: EditorSettings) -> Editor {
    let mut editor = Editor::new(settings);
    editor.load(&sample_deck()).unwrap();
    editor
}

fn editor() -> Editor {
    editor_with(EditorSettings::default())
}

/// Text of the element at `index` on the current slide
fn text_at(editor: &Editor, index: usize) -> Option<String> {
    let slide = editor.current_slide()?;
    slide.elements.get(index)?.text_value().map(str::to_string)
}

fn element_at(editor: &Editor, index: usize) -> ElementId {
    editor.current_slide().unwrap().elements[index].id
}

#[test]
fn test_load_selects_first_slide() {
    let editor = editor();
    assert_eq!(editor.slides().len(), 2);
    assert_eq!(editor.current_slide().unwrap().number, 1);
    assert!(editor.selected_element().is_none());
    assert!(!editor.can_undo());
    assert!(!editor.is_dirty());
}

#[test]
fn test_slide_navigation() {
    let mut editor = editor();

    assert_eq!(editor.next_slide().map(|s| s.number), Some(2));
    assert!(editor.next_slide().is_none());
    assert_eq!(editor.current_slide().unwrap().number, 2);

    assert_eq!(editor.previous_slide().map(|s| s.number), Some(1));
    assert!(editor.previous_slide().is_none());

    assert!(editor.select_slide_number(2));
    assert!(!editor.select_slide_number(3));
    assert_eq!(editor.current_slide().unwrap().number, 2);
}

#[test]
fn test_selection_is_scoped_to_current_slide() {
    let mut editor = editor();
    let caption = element_at(&editor, 2);
    let second_slide = editor.slides()[1].id;

    assert!(editor.select_element(caption));
    assert_eq!(editor.selected_element(), Some(caption));

    assert!(editor.select_slide(second_slide));
    assert!(editor.selected_element().is_none());
    assert!(!editor.select_element(caption));

    editor.previous_slide();
    editor.select_element(caption);
    editor.clear_selection();
    assert!(editor.selected_element().is_none());
}

#[test]
fn test_text_edit_undo_redo() {
    let mut editor = editor();
    editor.next_slide();
    let title = element_at(&editor, 0);

    assert!(editor.update_text(title, "World"));
    assert_eq!(text_at(&editor, 0).as_deref(), Some("World"));
    assert!(editor.is_dirty());

    let history = editor.change_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), ChangeKind::Update);
    assert_eq!(history[0].element_id(), title);
    assert_eq!(history[0].previous_state().unwrap().text_value(), Some("Hello"));
    assert_eq!(history[0].new_state().unwrap().text_value(), Some("World"));

    assert!(editor.undo());
    assert_eq!(text_at(&editor, 0).as_deref(), Some("Hello"));
    assert!(editor.change_history().is_empty());
    assert!(!editor.undo());

    assert!(editor.redo());
    assert_eq!(text_at(&editor, 0).as_deref(), Some("World"));
    assert_eq!(editor.change_history().len(), 1);
    assert!(!editor.redo());
}

#[test]
fn test_undo_of_stale_change_leaves_history_alone() {
    let store = Arc::new(MemorySnapshotStore::new());
    let mut editor = Editor::default().with_snapshot_store(store.clone());
    editor.load(&sample_deck()).unwrap();
    let caption = element_at(&editor, 2);
    editor.update_text(caption, "Changed");

    // A snapshot whose document no longer holds the edited element
    let mut snapshot = store.load().unwrap().unwrap();
    snapshot.document.slides[0].elements.retain(|e| e.id != caption);
    store.save(&snapshot).unwrap();

    let mut restored = Editor::default().with_snapshot_store(store);
    assert!(restored.restore_autosave().unwrap());
    let before = restored.document().cloned();

    assert!(!restored.undo());
    assert!(restored.can_undo());
    assert!(!restored.can_redo());
    assert_eq!(restored.change_history().len(), 1);
    assert_eq!(restored.document().cloned(), before);
}

#[test]
fn test_restore_into_smaller_history_only_undoes_applied_changes() {
    let store = Arc::new(MemorySnapshotStore::new());
    let mut editor = Editor::default().with_snapshot_store(store.clone());
    editor.load(&sample_deck()).unwrap();
    let caption = element_at(&editor, 2);
    for i in 0..6 {
        editor.update_text(caption, &format!("v{i}"));
    }
    for _ in 0..3 {
        editor.undo();
    }
    assert_eq!(text_at(&editor, 2).as_deref(), Some("v2"));

    let mut settings = EditorSettings::default();
    settings.history.capacity = 2;
    let mut restored = Editor::new(settings).with_snapshot_store(store);
    assert!(restored.restore_autosave().unwrap());

    // The kept records are v4 and v5, both on the redo branch
    assert!(!restored.can_undo());
    assert!(!restored.undo());
    assert_eq!(text_at(&restored, 2).as_deref(), Some("v2"));
}

#[test]
fn test_edits_on_missing_elements_are_not_recorded() {
    let mut editor = editor();
    let title_on_other_slide = editor.slides()[1].elements[0].id;

    assert!(!editor.update_text(title_on_other_slide, "Nope"));
    assert!(!editor.delete_element(title_on_other_slide));
    assert!(!editor.can_undo());
    assert!(!editor.is_dirty());
}

#[test]
fn test_undo_delete_restores_element() {
    let mut editor = editor();
    let caption = element_at(&editor, 2);
    editor.select_element(caption);

    assert!(editor.delete_element(caption));
    assert!(editor.selected_element().is_none());
    assert_eq!(editor.current_slide().unwrap().elements.len(), 2);

    assert!(editor.undo());
    let slide = editor.current_slide().unwrap();
    let restored = slide.element(caption).unwrap();
    assert_eq!(restored.text_value(), Some("Caption"));
    assert_eq!(restored.z_order, 2);
}

#[test]
fn test_add_then_delete_then_undo_twice() {
    let mut editor = editor();
    let added = editor
        .add_element(
            ElementKind::Shape,
            Position::new(10.0, 10.0),
            Size::new(50.0, 50.0),
            None,
        )
        .unwrap();
    assert_eq!(editor.selected_element(), Some(added));
    assert_eq!(editor.current_slide().unwrap().element(added).unwrap().z_order, 3);

    assert!(editor.delete_element(added));
    assert!(editor.undo());
    assert!(editor.current_slide().unwrap().element(added).is_some());

    assert!(editor.undo());
    assert!(editor.current_slide().unwrap().element(added).is_none());
    assert_eq!(editor.current_slide().unwrap().elements.len(), 3);
}

#[test]
fn test_undo_of_add_clears_selection() {
    let mut editor = editor();
    let added = editor
        .add_element(ElementKind::Text, Position::default(), Size::new(5.0, 5.0), None)
        .unwrap();
    assert_eq!(editor.selected_element(), Some(added));

    editor.undo();
    assert!(editor.selected_element().is_none());
}

#[test]
fn test_new_edit_discards_redo_branch() {
    let mut editor = editor();
    let caption = element_at(&editor, 2);

    editor.update_text(caption, "A");
    editor.update_text(caption, "B");
    editor.undo();
    assert!(editor.can_redo());

    editor.update_text(caption, "C");
    assert!(!editor.can_redo());
    assert!(!editor.redo());

    let history = editor.change_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].new_state().unwrap().text_value(), Some("C"));
}

#[test]
fn test_history_is_bounded() {
    let mut settings = EditorSettings::default();
    settings.history.capacity = 3;
    let mut editor = editor_with(settings);
    let caption = element_at(&editor, 2);

    for i in 0..8 {
        editor.update_text(caption, &format!("v{i}"));
    }
    assert_eq!(editor.change_history().len(), 3);

    for _ in 0..3 {
        assert!(editor.undo());
    }
    assert!(!editor.undo());
    assert_eq!(text_at(&editor, 2).as_deref(), Some("v4"));
}

#[test]
fn test_revert_slide_keeps_other_slides() {
    let mut editor = editor();
    let first = editor.slides()[0].id;
    let caption = element_at(&editor, 2);
    editor.update_text(caption, "Changed");
    editor.update_element_position(caption, Position::new(1.0, 1.0));

    editor.next_slide();
    let title = element_at(&editor, 0);
    editor.update_text(title, "World");

    assert_eq!(editor.revert_slide(first), 2);
    assert_eq!(text_at(&editor, 0).as_deref(), Some("World"));
    assert_eq!(editor.change_history().len(), 1);

    editor.previous_slide();
    assert_eq!(text_at(&editor, 2).as_deref(), Some("Caption"));
    assert_eq!(
        editor.current_slide().unwrap().elements[2].position,
        Position::new(100.0, 200.0)
    );
}

#[test]
fn test_revert_all_restores_source() {
    let deck = sample_deck();
    let mut editor = editor();
    let shape = element_at(&editor, 0);
    let caption = element_at(&editor, 2);

    editor.update_text(caption, "Changed");
    editor.update_element_size(shape, Size::new(1.0, 1.0));
    editor.delete_element(shape);
    editor.add_element(ElementKind::Text, Position::default(), Size::new(5.0, 5.0), None);

    assert_eq!(editor.revert_all(), 4);
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
    assert_eq!(editor.current_slide().unwrap().elements.len(), 3);
    assert_eq!(editor.export().unwrap(), deck);
}

#[test]
fn test_change_summary() {
    let mut editor = editor();
    let caption = element_at(&editor, 2);
    let shape = element_at(&editor, 0);

    editor.update_text(caption, "One");
    editor.update_element_style(
        caption,
        &StylePatch {
            italic: Some(true),
            ..Default::default()
        },
    );
    editor.delete_element(shape);
    editor.add_element(ElementKind::Shape, Position::default(), Size::new(5.0, 5.0), None);
    editor.undo();

    let summary = editor.change_summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.updates, 2);
    assert_eq!(summary.deletions, 1);
    assert_eq!(summary.additions, 0);
    assert!(summary.last_change_time.is_some());
}

#[test]
fn test_export_after_edit() {
    let mut editor = editor();
    editor.next_slide();
    let title = element_at(&editor, 0);
    editor.update_text(title, "World");

    let bytes = editor.export().unwrap();
    let mut reopened = Editor::default();
    reopened.load(&bytes).unwrap();
    assert_eq!(reopened.slides()[1].elements[0].text_value(), Some("World"));
    assert_eq!(reopened.slides()[0].elements[2].text_value(), Some("Caption"));
}

#[test]
fn test_text_box_uses_new_element_defaults() {
    let mut editor = editor();
    let id = editor.add_text_box(Position::new(5.0, 5.0), "Note").unwrap();

    let element = editor.current_slide().unwrap().element(id).unwrap().clone();
    assert_eq!(element.text_value(), Some("Note"));
    assert_eq!(element.size, Size::new(200.0, 100.0));
    let style = element.style.unwrap();
    assert_eq!(style.font_family.as_deref(), Some("Calibri"));
    assert_eq!(style.font_size, Some(18.0));

    let outcome = editor.export_with_outcome().unwrap();
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, SkipReason::AddedElement);
}

#[test]
fn test_save_as_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("deck.pptx");
    let mut editor = editor();
    let caption = element_at(&editor, 2);
    editor.update_text(caption, "Saved");

    editor.save_as(&path).unwrap();
    assert!(!editor.is_dirty());

    let mut reopened = Editor::default();
    reopened.load_file(&path).unwrap();
    assert_eq!(text_at(&reopened, 2).as_deref(), Some("Saved"));
}

#[test]
fn test_autosave_restore_from_memory() {
    let store = Arc::new(MemorySnapshotStore::new());
    let mut editor = Editor::default().with_snapshot_store(store.clone());
    editor.load(&sample_deck()).unwrap();
    editor.next_slide();
    let title = element_at(&editor, 0);
    editor.update_text(title, "World");
    editor.update_text(title, "Again");
    editor.undo();

    let snapshot = store.load().unwrap().unwrap();
    assert_eq!(snapshot.history_position, 1);
    assert_eq!(snapshot.changes.len(), 2);

    let mut restored = Editor::default().with_snapshot_store(store);
    assert!(restored.restore_autosave().unwrap());
    assert_eq!(restored.document(), editor.document());
    assert!(restored.can_undo());
    assert!(restored.can_redo());

    restored.select_slide_number(2);
    assert!(restored.redo());
    assert_eq!(text_at(&restored, 0).as_deref(), Some("Again"));

    let bytes = restored.export().unwrap();
    let mut reopened = Editor::default();
    reopened.load(&bytes).unwrap();
    assert_eq!(reopened.slides()[1].elements[0].text_value(), Some("Again"));
}

#[test]
fn test_autosave_restore_from_file() {
    let dir = TempDir::new().unwrap();
    let mut editor = Editor::default().with_snapshot_store(FileSnapshotStore::new(dir.path()));
    editor.load(&sample_deck()).unwrap();
    let caption = element_at(&editor, 2);
    editor.delete_element(caption);

    let mut restored = Editor::default().with_snapshot_store(FileSnapshotStore::new(dir.path()));
    assert!(restored.restore_autosave().unwrap());
    assert_eq!(restored.current_slide().unwrap().elements.len(), 2);

    assert!(restored.undo());
    assert_eq!(text_at(&restored, 2).as_deref(), Some("Caption"));

    restored.discard_autosave().unwrap();
    let mut empty = Editor::default().with_snapshot_store(FileSnapshotStore::new(dir.path()));
    assert!(!empty.restore_autosave().unwrap());
}

#[test]
fn test_disabled_autosave_writes_nothing() {
    let store = Arc::new(MemorySnapshotStore::new());
    let mut settings = EditorSettings::default();
    settings.autosave.enabled = false;

    let mut editor = Editor::new(settings).with_snapshot_store(store.clone());
    editor.load(&sample_deck()).unwrap();
    let caption = element_at(&editor, 2);
    editor.update_text(caption, "Changed");

    assert!(store.load().unwrap().is_none());
}
