use super::*;

const DECK: &str = r#"{
    "id": 7,
    "theme": "dark",
    "playback": { "loop_playback": true },
    "slides": [
        {
            "id": 1,
            "title": "Quarterly",
            "description": "  ",
            "playback_time": 0,
            "elements": [
                {
                    "id": 10, "slide_id": 1, "type": "text", "position": "left", "order": 2,
                    "properties": [{ "name": "text", "value": "hello" }]
                },
                {
                    "id": 11, "slide_id": 1, "type": "hologram", "position": "free",
                    "elevation": 3,
                    "offset": { "left": 10.0, "top": 20.0, "viewport": { "width": 500.0, "height": 300.0 } }
                }
            ]
        },
        { "id": 2, "playback_time": 4, "elements": [] }
    ]
}"#;

#[test]
fn parses_documents_with_defaults() {
    let p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    p.validate().unwrap();
    assert_eq!(p.theme, "dark");
    assert!(p.playback.loop_playback);
    assert!(p.playback.autoplay);
    assert!(!p.playback.password_protected);
    assert_eq!(p.slides[0].elements[1].kind, ElementKind::Unknown);
    assert_eq!(p.slides[0].elements[0].position, Position::Left);
    assert_eq!(p.slides[0].elements[1].elevation, Some(3));
}

#[test]
fn playback_duration_falls_back_for_zero_or_missing() {
    let p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    let default = Millis::from_secs(10);
    assert_eq!(p.slides[0].playback_duration(default), default);
    assert_eq!(p.slides[1].playback_duration(default), Millis(4000));
}

#[test]
fn meta_elements_skip_blank_strings() {
    let p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    let meta = p.slides[0].meta_elements();
    assert_eq!(meta.len(), 1);
    assert_eq!(meta[0].id, TITLE_ELEMENT_ID);
    assert_eq!(meta[0].kind, ElementKind::Title);
    assert_eq!(meta[0].position, Position::Top);
    assert_eq!(meta[0].property("text"), Some("Quarterly"));
}

#[test]
fn validate_rejects_reserved_and_duplicate_ids() {
    let mut p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    p.slides[0].elements[1].id = 10;
    assert!(p.validate().is_err());

    let mut p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    p.slides[0].elements[0].id = -5;
    assert!(p.validate().is_err());

    let mut p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    p.slides[0].elements[0].slide_id = 2;
    assert!(p.validate().is_err());
}

#[test]
fn unsigned_widgets_are_detected() {
    let mut p = Presentation::from_reader(DECK.as_bytes()).unwrap();
    assert!(!p.has_unsigned_widgets());
    p.slides[1].elements.push(Element {
        id: 1,
        slide_id: 2,
        kind: ElementKind::Widget,
        position: Position::Center,
        order: 0,
        elevation: None,
        offset: None,
        properties: vec![Property::new("code", "render()")],
    });
    assert!(p.has_unsigned_widgets());
    p.slides[1].elements[0]
        .properties
        .push(Property::new("signature", "abc"));
    assert!(!p.has_unsigned_widgets());
}

#[test]
fn position_parse_is_case_insensitive() {
    assert_eq!(Position::parse(" Center ").unwrap(), Position::Center);
    assert!(Position::parse("diagonal").is_err());
    assert_eq!(Position::Left.stack_class(), "stack-left");
}
