mod common;

use std::cell::RefCell;
use std::rc::Rc;

use canvas_paint::commit::actions;
use canvas_paint::{Commit, Document, EditorContext, EngineConfig, InputEvent};
use common::*;
use egui::{Key, Pos2};

fn attached(document: &Rc<RefCell<Document>>) -> EditorContext {
    let sink_document = Rc::clone(document);
    EditorContext::from_document(&document.borrow(), EngineConfig::default(), move |commit: Commit| {
        sink_document.borrow_mut().apply_commit(commit);
    })
}

#[test]
fn undo_and_redo_flow_back_into_the_canvas() {
    let document = Rc::new(RefCell::new(Document::new(60, 40)));
    let mut ctx = attached(&document);

    drag(&mut ctx, Pos2::new(5.0, 20.0), Pos2::new(50.0, 20.0));
    let drawn = ctx.canvas().image().clone();
    assert_eq!(document.borrow().undo_action(), Some(actions::DRAW));
    // The engine's own commit comes back as an echo and is not reloaded.
    assert!(!ctx.sync_document(&document.borrow()));

    assert!(document.borrow_mut().undo());
    assert!(ctx.sync_document(&document.borrow()));
    assert!(ctx.canvas().image().pixels().all(|p| *p == WHITE));
    assert_eq!(document.borrow().redo_action(), Some(actions::DRAW));

    assert!(document.borrow_mut().redo());
    assert!(ctx.sync_document(&document.borrow()));
    assert_eq!(ctx.canvas().image().as_raw(), drawn.as_raw());
}

#[test]
fn undo_drops_a_floating_selection() {
    let document = Rc::new(RefCell::new(Document::new(60, 40)));
    let mut ctx = attached(&document);
    ctx.handle_event(&InputEvent::key(Key::L));
    drag(&mut ctx, Pos2::new(5.0, 5.0), Pos2::new(55.0, 35.0));
    ctx.select_all();
    assert!(ctx.selection().is_some());

    assert!(document.borrow_mut().undo());
    assert!(ctx.sync_document(&document.borrow()));
    assert!(ctx.selection().is_none());
    assert_eq!(ctx.state(), canvas_paint::EditorState::Idle);
}

#[test]
fn resize_is_one_undo_step() {
    let document = Rc::new(RefCell::new(Document::new(60, 40)));
    let mut ctx = attached(&document);
    assert!(ctx.resize_canvas(80, 80));
    assert_eq!((document.borrow().width(), document.borrow().height()), (80, 80));

    assert!(document.borrow_mut().undo());
    assert!(ctx.sync_document(&document.borrow()));
    assert_eq!((ctx.canvas().width(), ctx.canvas().height()), (60, 40));
    assert!(!document.borrow().can_undo());
}
