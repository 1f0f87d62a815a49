use super::*;

#[test]
fn defaults_carry_documented_thresholds() {
    let cfg = PlayerConfig::default();
    assert_eq!(cfg.drag_threshold_px, 6.0);
    assert_eq!(cfg.center_proximity_px, 35.0);
    assert_eq!(cfg.mid_proximity_px, 75.0);
    assert_eq!(cfg.before_animate, Millis(50));
    assert_eq!(cfg.reveal_cadence, Millis(200));
    assert_eq!(cfg.resize_debounce, Millis(50));
    assert_eq!(cfg.measure_retries, 10);
    assert_eq!(cfg.timing.appear_base, 600);
}

#[test]
fn partial_override_keeps_other_defaults() {
    let cfg = PlayerConfig::from_reader(
        r#"{ "drag_threshold_px": 12.0, "timing": { "callout_delay": 1 } }"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.drag_threshold_px, 12.0);
    assert_eq!(cfg.timing.callout_delay, 1);
    assert_eq!(cfg.timing.progress_delay, 800);
    assert_eq!(cfg.reveal_cadence, Millis(200));
}

#[test]
fn rejects_degenerate_values() {
    assert!(PlayerConfig::from_reader(r#"{ "aspect_ratio": 0.0 }"#.as_bytes()).is_err());
    assert!(PlayerConfig::from_reader(r#"{ "reveal_cadence": 0 }"#.as_bytes()).is_err());
    assert!(PlayerConfig::from_reader(r#"{ "stack_gap_px": -1.0 }"#.as_bytes()).is_err());
    assert!(PlayerConfig::from_reader("[]".as_bytes()).is_err());
}

#[test]
fn only_objects_are_accepted_as_overrides() {
    for text in ["[]", "[6.0]", "null", "3", r#""strict""#] {
        let err = PlayerConfig::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, SlideError::Serde(_)), "{text}: {err}");
    }
    assert!(PlayerConfig::from_reader("{}".as_bytes()).is_ok());
}
