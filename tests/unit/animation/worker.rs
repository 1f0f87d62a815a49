use super::*;

#[test]
fn staggered_run_reveals_each_element_then_stops() {
    let mut w = RevealWorker::new(RevealMode::Staggered);
    w.restart(3);
    assert_eq!(w.tick(), RevealStep::One { index: 0, more: true });
    assert_eq!(w.tick(), RevealStep::One { index: 1, more: true });
    assert_eq!(w.cursor(), 2);
    assert_eq!(w.tick(), RevealStep::One { index: 2, more: false });
    assert!(!w.is_running());
    assert_eq!(w.tick(), RevealStep::Idle);
}

#[test]
fn stop_resets_and_restart_begins_again() {
    let mut w = RevealWorker::default();
    w.restart(5);
    w.tick();
    w.tick();
    w.stop();
    assert_eq!(w.cursor(), 0);
    assert_eq!(w.tick(), RevealStep::Idle);

    w.restart(2);
    assert_eq!(w.state(), WorkerState::Running { cursor: 0 });
    assert_eq!(w.tick(), RevealStep::One { index: 0, more: true });
}

#[test]
fn simultaneous_mode_reveals_everything_in_one_tick() {
    let mut w = RevealWorker::new(RevealMode::Simultaneous);
    w.restart(4);
    assert_eq!(w.tick(), RevealStep::All(0..4));
    assert_eq!(w.tick(), RevealStep::Idle);
    w.restart(0);
    assert!(!w.is_running());
}
