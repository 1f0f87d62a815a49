use super::*;

fn nid(index: u32) -> NodeId {
    NodeId {
        index,
        generation: 0,
    }
}

#[test]
fn small_movements_do_not_start_a_drag() {
    let mut t = MoveTarget::begin_move(nid(1), Point::new(100.0, 100.0), Point::new(110.0, 120.0), 6.0);
    assert_eq!(t.move_to(Point::new(113.0, 123.0)), None);
    assert!(!t.is_dragging());
    assert!(!t.end_move());
}

#[test]
fn drag_keeps_the_grab_offset() {
    let mut t = MoveTarget::begin_move(nid(1), Point::new(100.0, 100.0), Point::new(110.0, 120.0), 6.0);
    assert_eq!(t.move_to(Point::new(150.0, 120.0)), Some(Point::new(140.0, 100.0)));
    // Once engaged, small moves are followed too.
    assert_eq!(t.move_to(Point::new(151.0, 120.0)), Some(Point::new(141.0, 100.0)));
    assert_eq!(t.delta(), Vec2::new(41.0, 0.0));
    assert!(t.end_move());
}

#[test]
fn group_shadows_follow_anchor_delta() {
    let anchor = MoveTarget::begin_move(nid(1), Point::new(0.0, 0.0), Point::new(5.0, 5.0), 6.0);
    let mut g = MoveTargetGroup::new(anchor, vec![(nid(2), Point::new(200.0, 50.0))]);
    assert_eq!(g.move_to(Point::new(6.0, 6.0)), None);
    let moved = g.move_to(Point::new(25.0, 15.0)).unwrap();
    assert_eq!(
        moved,
        vec![
            (nid(1), Point::new(20.0, 10.0)),
            (nid(2), Point::new(220.0, 60.0))
        ]
    );
    assert_eq!(g.nodes(), vec![nid(1), nid(2)]);
    let done = g.end_move().unwrap();
    assert_eq!(done[1], (nid(2), Point::new(220.0, 60.0)));
}
