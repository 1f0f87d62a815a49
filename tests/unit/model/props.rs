use super::*;

fn props(pairs: &[(&str, &str)]) -> Vec<Property> {
    pairs.iter().map(|(k, v)| Property::new(*k, *v)).collect()
}

#[test]
fn text_decodes_known_names_and_clamps() {
    let p = ElementProps::decode(
        &ElementKind::Text,
        &props(&[
            ("text", "Hi"),
            ("isBold", "true"),
            ("fontSize", "900"),
            ("width", "-4"),
            ("sparkle", "yes"),
        ]),
    );
    let ElementProps::Text(t) = p else {
        panic!("expected text props");
    };
    assert_eq!(t.text, "Hi");
    assert!(t.is_bold);
    assert!(!t.is_italic);
    assert_eq!(t.font_size, Some(200.0));
    assert_eq!(t.width, Some(1.0));
}

#[test]
fn unknown_names_are_kept_aside() {
    let raw = props(&[("text", "Hi"), ("sparkle", "yes"), ("isBold", "true")]);
    let decoded = ElementProps::decode(&ElementKind::Text, &raw);
    let ElementProps::Text(t) = &decoded else {
        panic!("expected text props");
    };
    assert_eq!(t.extra.len(), 1);
    assert_eq!(t.extra.get("sparkle"), Some("yes"));
    assert_eq!(t.extra.get("text"), None);
    assert_eq!(decoded.extra(), &t.extra);

    let ElementProps::Widget(w) = ElementProps::decode(
        &ElementKind::Widget,
        &props(&[("code", "x"), ("height", "300"), ("theme", "dark")]),
    ) else {
        panic!("expected widget props");
    };
    assert_eq!(w.extra.len(), 2);
    assert_eq!(w.extra.get("theme"), Some("dark"));

    let bare = ElementProps::decode(&ElementKind::Timeline, &props(&[("data", "[]")]));
    assert!(bare.extra().is_empty());

    let unknown = ElementProps::decode(&ElementKind::Unknown, &raw);
    assert_eq!(unknown.extra().len(), 3);
}

#[test]
fn out_of_range_rotation_and_percent_are_clamped() {
    let ElementProps::Image(i) =
        ElementProps::decode(&ElementKind::Image, &props(&[("rotation", "725")]))
    else {
        panic!("expected image props");
    };
    assert_eq!(i.rotation, 360.0);

    let ElementProps::Progress(p) =
        ElementProps::decode(&ElementKind::Progress, &props(&[("value", "140")]))
    else {
        panic!("expected progress props");
    };
    assert_eq!(p.value, 100.0);
}

#[test]
fn grids_decode_leniently() {
    let g = DataGrid::parse(r#"[["a", 1, null], ["b"]]"#);
    assert_eq!(g.row_count(), 2);
    assert_eq!(g.column_count(), 3);
    assert_eq!(g.rows[0], vec!["a".to_owned(), "1".to_owned(), String::new()]);
    assert_eq!(DataGrid::parse("not json"), DataGrid::default());
}

#[test]
fn chart_kind_detection() {
    let ElementProps::Chart(c) =
        ElementProps::decode(&ElementKind::Chart, &props(&[("chartType", "StackedBar")]))
    else {
        panic!("expected chart props");
    };
    assert!(c.is_bar_or_line());
    let ElementProps::Chart(c) =
        ElementProps::decode(&ElementKind::Chart, &props(&[("chartType", "pie")]))
    else {
        panic!("expected chart props");
    };
    assert!(!c.is_bar_or_line());
}

#[test]
fn last_duplicate_name_wins() {
    let bag = PropertyBag::from_properties(&props(&[("text", "a"), ("text", "b")]));
    assert_eq!(bag.get("text"), Some("b"));
}
