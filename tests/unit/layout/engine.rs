use std::cell::Cell;

use super::*;
use crate::{
    model::presentation::{ElementKind, Property},
    render::element::PlaceholderRenderer,
};

fn el(id: i64, position: Position, order: i32) -> Element {
    Element {
        id,
        slide_id: 7,
        kind: ElementKind::Text,
        position,
        order,
        elevation: None,
        offset: None,
        properties: vec![Property::new("text", format!("element {id}"))],
    }
}

fn engine() -> LayoutEngine {
    let mut engine = LayoutEngine::new(&PlayerConfig::default(), Box::new(PlaceholderRenderer));
    engine.set_viewport(Viewport::new(1000.0, 600.0).unwrap());
    engine
}

fn separators(engine: &LayoutEngine) -> usize {
    let doc = engine.document();
    doc.descendants(doc.root())
        .into_iter()
        .filter(|n| doc.get(*n).is_some_and(|n| n.is_separator()))
        .count()
}

#[test]
fn ensure_element_is_idempotent() {
    let mut engine = engine();
    let elements = [
        el(1, Position::Left, 2),
        el(2, Position::Left, 1),
        el(3, Position::Top, 0),
    ];
    for e in &elements {
        engine
            .ensure_element(e, None, None, EnsureOptions::default())
            .unwrap();
    }
    let first = engine.snapshot(7).unwrap();
    let seps = separators(&engine);

    for e in &elements {
        engine
            .ensure_element(e, None, None, EnsureOptions::default())
            .unwrap();
    }
    assert_eq!(engine.snapshot(7).unwrap(), first);
    assert_eq!(separators(&engine), seps);
    assert_eq!(engine.remembered_len(), 3);
}

#[test]
fn initializer_runs_only_for_new_nodes() {
    let mut engine = engine();
    let calls = Cell::new(0);
    let init = |doc: &mut Document, node: NodeId| {
        calls.set(calls.get() + 1);
        doc.add_class(node, "custom")
    };
    let e = el(1, Position::Center, 0);
    let a = engine
        .ensure_element(&e, None, Some(&init), EnsureOptions::default())
        .unwrap();
    let b = engine
        .ensure_element(&e, Some(a), Some(&init), EnsureOptions::default())
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(calls.get(), 1);
    assert!(engine.document().has_class(a, "custom"));
}

#[test]
fn free_offsets_scale_with_the_viewport() {
    let mut engine = engine();
    let mut e = el(1, Position::Free, 0);
    e.offset = Some(Offset {
        left: 100.0,
        top: 50.0,
        viewport: Some(Viewport::new(1000.0, 600.0).unwrap()),
    });
    engine.set_viewport(Viewport::new(500.0, 300.0).unwrap());
    let node = engine
        .ensure_element(&e, None, None, EnsureOptions::default())
        .unwrap();
    engine.measure(7).unwrap();
    assert_eq!(engine.document().node(node).unwrap().rect.origin(), Point::new(50.0, 25.0));

    engine.set_viewport(Viewport::new(2000.0, 1200.0).unwrap());
    assert_eq!(engine.refresh_all().unwrap(), 1);
    engine.measure(7).unwrap();
    assert_eq!(engine.document().node(node).unwrap().rect.origin(), Point::new(200.0, 100.0));
}

#[test]
fn renderer_failure_becomes_inline_error_text() {
    let mut engine = engine();
    let mut widget = el(1, Position::Center, 0);
    widget.kind = ElementKind::Widget;
    widget.properties = vec![Property::new("code", "if (x { y }")];
    let bad = engine
        .ensure_element(&widget, None, None, EnsureOptions::default())
        .unwrap();
    let good = engine
        .ensure_element(&el(2, Position::Center, 1), None, None, EnsureOptions::default())
        .unwrap();

    let bad = engine.document().node(bad).unwrap();
    assert!(bad.error.is_some());
    assert!(bad.content.as_deref().unwrap().starts_with("Error:"));
    assert!(engine.document().node(good).unwrap().error.is_none());
}

#[test]
fn nodes_become_visible_on_the_deferred_tick() {
    let mut engine = engine();
    let node = engine
        .ensure_element(&el(1, Position::Top, 0), None, None, EnsureOptions::default())
        .unwrap();
    assert!(!engine.document().has_class(node, CLASS_VISIBLE));
    assert!(engine.has_pending_visible());
    assert_eq!(engine.flush_visible().unwrap(), 1);
    assert!(engine.document().has_class(node, CLASS_VISIBLE));

    engine
        .ensure_element(&el(1, Position::Top, 0), None, None, EnsureOptions::default())
        .unwrap();
    assert!(!engine.has_pending_visible());
}

#[test]
fn indicated_removal_fades_one_node_at_a_time() {
    let mut engine = engine();
    for id in 1..=3 {
        engine
            .ensure_element(&el(id, Position::Right, id as i32), None, None, EnsureOptions::default())
            .unwrap();
    }
    engine.drain_events();

    assert_eq!(engine.remove_elements(&Selector::Slide(7), true).unwrap(), 3);
    let removing = |engine: &LayoutEngine| {
        engine
            .document()
            .select(engine.document().root(), &Selector::Class(CLASS_REMOVING.to_owned()))
            .len()
    };
    assert_eq!(removing(&engine), 1);
    let first = engine.fading().unwrap();

    let FadeProgress::Next(second) = engine.complete_fade().unwrap() else {
        panic!("expected a second fade");
    };
    assert_ne!(first, second);
    assert!(!engine.document().is_alive(first));
    assert_eq!(removing(&engine), 1);
    assert!(matches!(engine.complete_fade().unwrap(), FadeProgress::Next(_)));
    assert_eq!(engine.complete_fade().unwrap(), FadeProgress::Done);
    assert_eq!(engine.complete_fade().unwrap(), FadeProgress::Idle);

    assert_eq!(engine.fades_completed(), 3);
    assert_eq!(engine.remembered_len(), 0);
    assert_eq!(separators(&engine), 0);
    assert_eq!(
        engine.drain_events(),
        vec![Event::LayoutChanged { slide_id: Some(7) }]
    );
}

#[test]
fn immediate_removal_notifies_once() {
    let mut engine = engine();
    for id in 1..=3 {
        engine
            .ensure_element(&el(id, Position::Left, id as i32), None, None, EnsureOptions::default())
            .unwrap();
    }
    engine.drain_events();
    let key = ElementKey::new(7, 2);
    assert_eq!(engine.remove_elements(&Selector::Element(key), false).unwrap(), 1);
    assert_eq!(engine.drain_events().len(), 1);
    assert_eq!(engine.remembered_len(), 2);
    assert_eq!(separators(&engine), 1);
}

#[test]
fn move_element_swaps_and_restores_orders() {
    let mut engine = engine();
    let a = engine
        .ensure_element(&el(1, Position::Top, 1), None, None, EnsureOptions::default())
        .unwrap();
    engine
        .ensure_element(&el(2, Position::Top, 2), None, None, EnsureOptions::default())
        .unwrap();

    let out = engine.move_element(a, 1).unwrap().unwrap();
    assert_eq!((out.moved.old_order, out.moved.new_order), (1, 2));
    assert_eq!(engine.remembered_element(a).unwrap().order, 2);

    let back = engine.move_element(a, -1).unwrap().unwrap();
    assert_eq!((back.moved.new_order, back.neighbor.new_order), (1, 2));
    assert_eq!(engine.remembered_element(a).unwrap().order, 1);
    assert_eq!(engine.move_element(a, -1).unwrap(), None);
}

#[test]
fn dragging_a_free_element_yields_a_persistable_offset() {
    let mut engine = engine();
    let mut e = el(1, Position::Free, 0);
    e.offset = Some(Offset {
        left: 100.0,
        top: 100.0,
        viewport: Some(engine.viewport()),
    });
    let node = engine
        .ensure_element(
            &e,
            None,
            None,
            EnsureOptions {
                draggable: true,
                always_on_top: false,
            },
        )
        .unwrap();
    engine.measure(7).unwrap();

    engine.begin_drag(node, Point::new(110.0, 110.0), &[]).unwrap();
    assert!(!engine.drag_to(Point::new(112.0, 112.0)).unwrap());
    assert!(engine.drag_to(Point::new(160.0, 130.0)).unwrap());
    assert!(engine.document().has_class(node, CLASS_DRAGGED));

    let moved = engine.end_drag().unwrap();
    assert_eq!(
        moved,
        vec![(
            e.key(),
            Offset {
                left: 150.0,
                top: 120.0,
                viewport: Some(Viewport::new(1000.0, 600.0).unwrap()),
            }
        )]
    );
    assert!(!engine.document().has_class(node, CLASS_DRAGGED));
}

#[test]
fn anchored_elements_are_not_draggable() {
    let mut engine = engine();
    let node = engine
        .ensure_element(
            &el(1, Position::Left, 0),
            None,
            None,
            EnsureOptions {
                draggable: true,
                always_on_top: false,
            },
        )
        .unwrap();
    assert!(engine.begin_drag(node, Point::ZERO, &[]).is_err());
}

#[test]
fn stale_remembered_state_is_pruned() {
    let mut engine = engine();
    let node = engine
        .ensure_element(&el(1, Position::Free, 0), None, None, EnsureOptions::default())
        .unwrap();
    engine
        .ensure_element(&el(2, Position::Free, 0), None, None, EnsureOptions::default())
        .unwrap();
    engine.document_mut().remove(node).unwrap();

    assert_eq!(engine.prune_remembered(), 1);
    assert_eq!(engine.refresh_all().unwrap(), 1);
}

#[test]
fn clear_slide_forgets_everything() {
    let mut engine = engine();
    engine
        .ensure_element(&el(1, Position::Center, 0), None, None, EnsureOptions::default())
        .unwrap();
    assert!(engine.clear_slide(7).unwrap());
    assert!(!engine.clear_slide(7).unwrap());
    assert_eq!(engine.remembered_len(), 0);
    assert!(engine.snapshot(7).is_none());
}
