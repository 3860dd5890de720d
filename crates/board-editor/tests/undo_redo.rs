//! Integration tests: undo/redo history through the controller.
//!
//! Verifies linear undo/redo discipline, the depth bound, per-gesture
//! granularity, and that restores flow back through the store.

use board_core::id::NodeId;
use board_core::model::*;
use board_core::store::Channel;
use board_editor::input::{FocusTarget, Hit, InputEvent, Modifiers, Side};
use board_editor::{BoardEditor, EditorConfig, ManualClock, MemoryRecordStore};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn editor_with_depth(depth: usize) -> BoardEditor {
    let _ = env_logger::builder().is_test(true).try_init();
    BoardEditor::new(
        Box::new(MemoryRecordStore::new()),
        Rc::new(ManualClock::new(42)),
        EditorConfig {
            history_depth: depth,
            ..EditorConfig::default()
        },
    )
}

fn drag_by_handle(ed: &mut BoardEditor, id: NodeId, dx: f32) {
    let start = ed.store().node(id).unwrap().position;
    ed.handle_pointer(
        &InputEvent::PointerDown {
            x: start.x,
            y: start.y,
            modifiers: Modifiers::NONE,
        },
        Hit::MoveHandle { id, side: Side::Right },
    );
    for step in 1..=5 {
        ed.handle_pointer(
            &InputEvent::PointerMove {
                x: start.x + dx * step as f32 / 5.0,
                y: start.y,
                modifiers: Modifiers::NONE,
            },
            Hit::Canvas,
        );
    }
    ed.handle_pointer(
        &InputEvent::PointerUp {
            x: start.x + dx,
            y: start.y,
        },
        Hit::Canvas,
    );
}

fn x_of(ed: &BoardEditor, id: NodeId) -> f32 {
    ed.store().node(id).unwrap().position.x
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_and_redo_are_linear() {
    let mut ed = editor_with_depth(100);
    let id = ed.create_node(NodeKind::Markdown).unwrap();
    let x0 = x_of(&ed, id);

    drag_by_handle(&mut ed, id, 100.0);
    drag_by_handle(&mut ed, id, 50.0);
    assert_eq!(x_of(&ed, id), x0 + 150.0);

    assert!(ed.undo());
    assert_eq!(x_of(&ed, id), x0 + 100.0);
    assert!(ed.undo());
    assert_eq!(x_of(&ed, id), x0);
    assert!(ed.undo());
    assert!(ed.store().node(id).is_none(), "creation is undoable");
    assert!(!ed.undo());

    assert!(ed.redo());
    assert!(ed.redo());
    assert!(ed.redo());
    assert_eq!(x_of(&ed, id), x0 + 150.0);
    assert!(!ed.redo());
}

#[test]
fn new_action_discards_redo_branch() {
    let mut ed = editor_with_depth(100);
    let id = ed.create_node(NodeKind::Markdown).unwrap();
    drag_by_handle(&mut ed, id, 10.0);
    assert!(ed.undo());
    assert!(ed.history().can_redo());

    drag_by_handle(&mut ed, id, 30.0);
    assert!(!ed.history().can_redo());
    assert!(!ed.redo());
}

#[test]
fn one_entry_per_gesture() {
    let mut ed = editor_with_depth(100);
    let id = ed.create_node(NodeKind::Iframe).unwrap();
    let before = ed.history().undo_depth();
    drag_by_handle(&mut ed, id, 200.0);
    assert_eq!(ed.history().undo_depth(), before + 1);
}

#[test]
fn depth_bound_drops_oldest() {
    let mut ed = editor_with_depth(3);
    let id = ed.create_node(NodeKind::Markdown).unwrap();
    let x0 = x_of(&ed, id);
    for _ in 0..5 {
        drag_by_handle(&mut ed, id, 10.0);
    }
    assert_eq!(ed.history().undo_depth(), 3);
    while ed.undo() {}
    assert_eq!(x_of(&ed, id), x0 + 20.0);
}

#[test]
fn keyboard_undo_redo() {
    let mut ed = editor_with_depth(100);
    let id = ed.create_node(NodeKind::Image).unwrap();
    let x0 = x_of(&ed, id);
    drag_by_handle(&mut ed, id, 25.0);

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    ed.handle_key("z", ctrl, FocusTarget::Canvas);
    assert_eq!(x_of(&ed, id), x0);
    ed.handle_key("y", ctrl, FocusTarget::Canvas);
    assert_eq!(x_of(&ed, id), x0 + 25.0);
    let ctrl_shift = Modifiers { shift: true, ..ctrl };
    ed.handle_key("z", ctrl, FocusTarget::Canvas);
    ed.handle_key("Z", ctrl_shift, FocusTarget::Canvas);
    assert_eq!(x_of(&ed, id), x0 + 25.0);
}

#[test]
fn undo_refused_while_locked() {
    let mut ed = editor_with_depth(100);
    ed.create_node(NodeKind::Markdown).unwrap();
    ed.set_locked(true);
    assert!(!ed.undo());
    assert_eq!(ed.store().nodes().len(), 1);
}

#[test]
fn restore_publishes_data_channels() {
    let mut ed = editor_with_depth(100);
    let id = ed.create_node(NodeKind::Markdown).unwrap();
    drag_by_handle(&mut ed, id, 40.0);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ed.store_mut()
        .subscribe(move |e| sink.borrow_mut().extend(e.channels.iter().copied()));
    ed.undo();
    assert!(seen.borrow().contains(&Channel::Nodes));
}
