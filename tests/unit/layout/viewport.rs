use super::*;

#[test]
fn wide_parent_is_height_limited() {
    let p = fit_viewport(Size::new(2020.0, 620.0), 5.0 / 3.0, 20.0);
    assert!((p.height - 600.0).abs() < 1e-9);
    assert!((p.width - 1000.0).abs() < 1e-9);
    assert!((p.margin_left - 510.0).abs() < 1e-9);
    assert!((p.margin_top - 10.0).abs() < 1e-9);
}

#[test]
fn tall_parent_is_width_limited() {
    let p = fit_viewport(Size::new(520.0, 2000.0), 5.0 / 3.0, 20.0);
    assert!((p.width - 500.0).abs() < 1e-9);
    assert!((p.height - 300.0).abs() < 1e-9);
    assert!((p.margin_top - 850.0).abs() < 1e-9);
}

#[test]
fn unmeasurable_parent_yields_empty_viewport() {
    assert_eq!(
        fit_viewport(Size::new(10.0, 10.0), 5.0 / 3.0, 20.0),
        ViewportParams::default()
    );
    assert!(!fit_viewport(Size::ZERO, 1.0, 0.0).viewport().is_measurable());
}
