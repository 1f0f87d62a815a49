use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::{
    foundation::core::{ElementKey, Point, Viewport},
    layout::dom::CLASS_REMOVING,
    model::presentation::{Element, ElementKind, Offset, Property, Slide},
};

fn element(slide_id: i64, id: i64, x: f64, y: f64) -> Element {
    Element {
        id,
        slide_id,
        kind: ElementKind::Text,
        position: Position::Free,
        order: id as i32,
        elevation: None,
        offset: Some(Offset {
            left: x,
            top: y,
            viewport: Some(Viewport::new(1000.0, 600.0).unwrap()),
        }),
        properties: vec![Property::new("text", format!("element {id}"))],
    }
}

fn deck(slides: usize, elements: usize) -> Presentation {
    Presentation {
        id: 42,
        slides: (0..slides)
            .map(|i| {
                let id = (i as i64 + 1) * 10;
                Slide {
                    id,
                    playback_time: Some(1),
                    elements: (0..elements)
                        .map(|j| element(id, j as i64 + 1, 20.0 + 300.0 * j as f64, 20.0))
                        .collect(),
                    ..Slide::default()
                }
            })
            .collect(),
        ..Presentation::default()
    }
}

type Log = Rc<RefCell<Vec<Event>>>;

fn player(host: HeadlessHost) -> (Player, Log) {
    let mut player = Player::new(PlayerConfig::default(), host);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    player.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));
    (player, log)
}

fn slide_changes(log: &Log) -> Vec<(usize, u64)> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::SlideChanged { index, at, .. } => Some((*index, at.0)),
            _ => None,
        })
        .collect()
}

fn states(log: &Log) -> Vec<PlaybackState> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

fn count(log: &Log, kind: EventKind) -> usize {
    log.borrow().iter().filter(|e| e.kind() == kind).count()
}

#[test]
fn autoplay_runs_every_slide_then_finishes() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(deck(2, 1)).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert!(p.progress_visible());

    // before-animate 50 + appear 600 + slide time 1000
    p.advance_to(Millis(1649)).unwrap();
    assert_eq!(slide_changes(&log), vec![(0, 0)]);
    // hide duration 300 for the single element fade
    p.advance_to(Millis(1950)).unwrap();
    assert_eq!(slide_changes(&log), vec![(0, 0), (1, 1950)]);

    p.advance_to(Millis(3599)).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    p.advance_to(Millis(3600)).unwrap();
    assert_eq!(p.state(), PlaybackState::Finished);
    assert!(p.closing_view());
    assert!(!p.progress_visible());
    assert_eq!(
        states(&log),
        vec![
            PlaybackState::Gating,
            PlaybackState::Ready,
            PlaybackState::Playing,
            PlaybackState::Finished
        ]
    );
    assert!(log.borrow().contains(&Event::Finished {
        presentation_id: 42,
        at: Millis(3600)
    }));
}

#[test]
fn loop_playback_restarts_from_the_first_slide() {
    let (mut p, log) = player(HeadlessHost::default());
    let mut presentation = deck(2, 1);
    presentation.playback.loop_playback = true;
    p.select_infographic(presentation).unwrap();

    p.advance_to(Millis(3600)).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.current_slide(), Some(0));
    assert_eq!(slide_changes(&log).last(), Some(&(0, 3600)));
    assert_eq!(count(&log, EventKind::Finished), 0);
    assert!(states(&log).ends_with(&[
        PlaybackState::Finished,
        PlaybackState::Ready,
        PlaybackState::Playing
    ]));
}

#[test]
fn forward_past_the_end_while_paused_loops_and_stays_paused() {
    let (mut p, log) = player(HeadlessHost::default());
    let mut presentation = deck(2, 1);
    presentation.playback.loop_playback = true;
    p.select_infographic(presentation).unwrap();
    p.pause().unwrap();
    p.jump_to(1).unwrap();
    p.advance_to(Millis(1000)).unwrap();
    assert_eq!(p.current_slide(), Some(1));

    p.forward().unwrap();
    assert_eq!(p.state(), PlaybackState::Paused);
    assert_eq!(p.current_slide(), Some(0));
    assert!(states(&log).ends_with(&[
        PlaybackState::Finished,
        PlaybackState::Ready,
        PlaybackState::Paused
    ]));

    p.advance_to(Millis(60_000)).unwrap();
    assert_eq!(p.state(), PlaybackState::Paused);
    assert_eq!(p.current_slide(), Some(0));
    assert_eq!(count(&log, EventKind::Finished), 0);
}

#[test]
fn looping_keeps_the_arena_bounded() {
    let (mut p, _log) = player(HeadlessHost::default());
    let mut presentation = deck(2, 3);
    presentation.playback.loop_playback = true;
    p.select_infographic(presentation).unwrap();

    p.advance_to(Millis::from_secs(200)).unwrap();
    let slots = p.engine().document().slot_count();
    let live = p.engine().document().len();
    p.advance_to(Millis::from_secs(2000)).unwrap();
    assert!(p.engine().document().slot_count() <= slots);
    assert!(p.engine().document().len() <= live + 8);
    assert!(slots < 64);
}

#[test]
fn pause_cancels_auto_advance_until_play() {
    let (mut p, _log) = player(HeadlessHost::default());
    p.select_infographic(deck(2, 1)).unwrap();
    p.advance_to(Millis(700)).unwrap();
    p.pause().unwrap();
    assert_eq!(p.state(), PlaybackState::Paused);

    p.advance_to(Millis(5000)).unwrap();
    assert_eq!(p.current_slide(), Some(0));

    p.play().unwrap();
    p.advance_to(Millis(5999)).unwrap();
    assert_eq!(p.current_slide(), Some(0));
    p.advance_to(Millis(6000)).unwrap();
    assert_eq!(p.current_slide(), Some(1));
}

#[test]
fn reveal_steps_follow_the_cadence() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(deck(1, 3)).unwrap();
    p.advance_to(Millis(1000)).unwrap();

    let steps: Vec<(usize, u64)> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::AnimationStep { step, at, .. } => Some((*step, at.0)),
            _ => None,
        })
        .collect();
    assert_eq!(steps, vec![(0, 50), (1, 250), (2, 450)]);
    let plan = p.plan().unwrap();
    assert_eq!((plan.appear, plan.hide), (Millis(1000), Millis(500)));
}

#[test]
fn reduced_motion_reveals_everything_at_once() {
    let mut host = HeadlessHost::default();
    host.reduced_motion = true;
    let (mut p, log) = player(host);
    p.select_infographic(deck(2, 3)).unwrap();
    assert_eq!(count(&log, EventKind::AnimationStep), 3);
    assert!(log.borrow().iter().all(|e| match e {
        Event::AnimationStep { at, .. } => *at == Millis::ZERO,
        _ => true,
    }));
    // fixed 300ms appear, then one second on screen
    p.advance_to(Millis(1299)).unwrap();
    assert_eq!(slide_changes(&log).len(), 1);
    p.advance_to(Millis(1300)).unwrap();
    assert_eq!(p.current_slide(), Some(1));
}

#[test]
fn previous_slide_fades_out_one_element_at_a_time() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(deck(2, 3)).unwrap();
    // 50 + 1000 appear + 1000 on screen
    p.advance_to(Millis(2050)).unwrap();
    let removing = |p: &Player| {
        let doc = p.engine().document();
        doc.select(doc.root(), &Selector::Class(CLASS_REMOVING.to_owned()))
            .len()
    };
    assert_eq!(removing(&p), 1);

    // hide 500 split over three fades of 166ms
    p.advance_to(Millis(2547)).unwrap();
    assert_eq!(p.engine().fades_completed(), 2);
    assert_eq!(removing(&p), 1);
    p.advance_to(Millis(2548)).unwrap();
    assert_eq!(p.engine().fades_completed(), 3);
    assert_eq!(slide_changes(&log).last(), Some(&(1, 2548)));
}

#[test]
fn replaying_the_current_slide_skips_the_fade() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(deck(2, 1)).unwrap();
    p.advance_to(Millis(700)).unwrap();
    p.jump_to(0).unwrap();
    assert_eq!(slide_changes(&log), vec![(0, 0), (0, 700)]);
    assert!(p.jump_to(5).is_err());
}

#[test]
fn keyboard_shortcuts_and_closing_view() {
    let (mut p, _log) = player(HeadlessHost::default());
    p.select_infographic(deck(2, 1)).unwrap();

    assert!(p.key(Key::Right).unwrap());
    assert_eq!(p.current_slide(), Some(1));
    assert!(p.key(Key::Space).unwrap());
    assert_eq!(p.state(), PlaybackState::Paused);
    assert!(p.key(Key::Left).unwrap());
    assert_eq!(p.current_slide(), Some(0));

    p.forward().unwrap();
    p.forward().unwrap();
    assert_eq!(p.state(), PlaybackState::Finished);
    assert!(!p.key(Key::Right).unwrap());
    assert!(!p.key(Key::Space).unwrap());

    p.restart().unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.current_slide(), Some(0));
    assert!(!p.closing_view());
}

struct Counting {
    requests: Rc<Cell<u32>>,
}

impl PasswordValidator for Counting {
    fn validate(&mut self, _id: i64, password: &str) -> SlideResult<Option<Presentation>> {
        self.requests.set(self.requests.get() + 1);
        Ok((password == "pw").then(Presentation::default))
    }
}

#[test]
fn password_gate_blocks_until_accepted_then_caches() {
    let requests = Rc::new(Cell::new(0));
    let (p, log) = player(HeadlessHost::default());
    let mut p = p.with_validator(Box::new(Counting {
        requests: Rc::clone(&requests),
    }));
    let mut locked = deck(1, 1);
    locked.playback.password_protected = true;

    p.select_infographic(locked.clone()).unwrap();
    assert_eq!(p.state(), PlaybackState::Gating);
    assert_eq!(p.pending_gate(), Some(GateKind::Password));

    assert_eq!(
        p.submit_password("nope").unwrap(),
        PasswordAttempt::Rejected { attempt: 1 }
    );
    assert_eq!(p.state(), PlaybackState::Gating);
    assert!(log.borrow().contains(&Event::PasswordRejected { attempt: 1 }));

    assert!(matches!(
        p.submit_password("pw").unwrap(),
        PasswordAttempt::Accepted(None)
    ));
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(requests.get(), 2);

    p.select_infographic(locked).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(requests.get(), 2);
    assert_eq!(count(&log, EventKind::PasswordRequired), 1);
    assert!(p.submit_password("pw").is_err());
}

#[test]
fn another_presentation_asks_for_its_own_password() {
    let requests = Rc::new(Cell::new(0));
    let (p, log) = player(HeadlessHost::default());
    let mut p = p.with_validator(Box::new(Counting {
        requests: Rc::clone(&requests),
    }));
    let mut first = deck(1, 1);
    first.playback.password_protected = true;
    let mut second = first.clone();
    second.id = 999;

    p.select_infographic(first).unwrap();
    p.submit_password("pw").unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);

    p.select_infographic(second).unwrap();
    assert_eq!(p.state(), PlaybackState::Gating);
    assert_eq!(p.pending_gate(), Some(GateKind::Password));
    assert_eq!(count(&log, EventKind::PasswordRequired), 2);
    assert!(log.borrow().contains(&Event::PasswordRequired { attempt: 1 }));
    assert_eq!(requests.get(), 1);

    p.submit_password("pw").unwrap();
    assert_eq!(requests.get(), 2);
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn unsafe_choice_does_not_carry_over_to_another_presentation() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(unsafe_deck()).unwrap();
    p.resolve_unsafe(UnsafeChoice::Proceed).unwrap();

    let mut other = unsafe_deck();
    other.id = 7;
    p.select_infographic(other).unwrap();
    assert_eq!(p.pending_gate(), Some(GateKind::UnsafeContent));
    assert_eq!(count(&log, EventKind::UnsafeContentWarning), 2);
}

fn unsafe_deck() -> Presentation {
    let mut d = deck(1, 1);
    d.slides[0].elements[0].kind = ElementKind::Widget;
    d.slides[0].elements[0].properties = vec![Property::new("code", "render()")];
    d
}

#[test]
fn unsafe_content_choice_is_asked_once() {
    let (mut p, log) = player(HeadlessHost::default());
    p.select_infographic(unsafe_deck()).unwrap();
    assert_eq!(p.pending_gate(), Some(GateKind::UnsafeContent));
    assert!(log.borrow().contains(&Event::UnsafeContentWarning {
        slide_ids: vec![10]
    }));

    p.resolve_unsafe(UnsafeChoice::Abort).unwrap();
    assert_eq!(p.state(), PlaybackState::Idle);

    p.select_infographic(unsafe_deck()).unwrap();
    assert_eq!(p.state(), PlaybackState::Idle);
    assert_eq!(count(&log, EventKind::UnsafeContentWarning), 1);
    assert!(p.resolve_unsafe(UnsafeChoice::Proceed).is_err());
}

#[test]
fn unsafe_content_proceed_and_trusted_bypass() {
    let (mut p, _log) = player(HeadlessHost::default());
    p.select_infographic(unsafe_deck()).unwrap();
    p.resolve_unsafe(UnsafeChoice::Proceed).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);

    let mut host = HeadlessHost::default();
    host.trusted_embedding = true;
    let (mut p, log) = player(host);
    p.select_infographic(unsafe_deck()).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert!(log.borrow().contains(&Event::GateResolved {
        gate: GateKind::UnsafeContent,
        outcome: GateOutcome::Bypassed
    }));
}

#[test]
fn viewport_measurement_is_retried_then_proceeds() {
    let mut host = HeadlessHost::default();
    host.unmeasured_polls = 3;
    let (mut p, _log) = player(host);
    p.select_infographic(deck(1, 1)).unwrap();
    assert_eq!(p.state(), PlaybackState::Gating);
    p.advance_to(Millis(29)).unwrap();
    assert_eq!(p.state(), PlaybackState::Gating);
    p.advance_to(Millis(30)).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.viewport_params().width, 1000.0);

    let mut host = HeadlessHost::default();
    host.unmeasured_polls = 100;
    let (mut p, _log) = player(host);
    p.select_infographic(deck(1, 1)).unwrap();
    p.advance_to(Millis(100)).unwrap();
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.host().polls, 11);
    assert_eq!(p.viewport_params().width, 0.0);
}

#[test]
fn resize_is_debounced() {
    let (mut p, _log) = player(HeadlessHost::default());
    p.select_infographic(deck(1, 1)).unwrap();
    p.notify_resize(Size::new(520.0, 320.0));
    p.advance_to(Millis(20)).unwrap();
    p.notify_resize(Size::new(2020.0, 1220.0));
    p.advance_to(Millis(69)).unwrap();
    assert_eq!(p.viewport_params().width, 1000.0);
    p.advance_to(Millis(70)).unwrap();
    assert_eq!(p.viewport_params().width, 2000.0);

    // Free element recorded at (20, 20) against 1000x600 doubles with the viewport.
    let key = ElementKey::new(10, 1);
    let doc = p.engine().document();
    let node = doc.find_element(doc.root(), key).unwrap();
    assert_eq!(doc.node(node).unwrap().rect.origin(), Point::new(40.0, 40.0));
    assert_eq!(p.engine().viewport().width, 2000.0);
}

#[test]
fn title_and_description_lead_the_reveal() {
    let (mut p, _log) = player(HeadlessHost::default());
    let mut d = deck(1, 3);
    d.slides[0].title = Some("Quarterly numbers".into());
    d.slides[0].description = Some("All regions".into());
    p.select_infographic(d).unwrap();
    p.advance_to(Millis(50)).unwrap();

    let keys = p.plan().unwrap().keys();
    assert_eq!(keys.len(), 5);
    assert_eq!(keys[0], ElementKey::new(10, -1));
    assert_eq!(keys[1], ElementKey::new(10, -2));
}
