use super::*;

fn cfg() -> TimingConfig {
    TimingConfig::default()
}

#[test]
fn plain_elements_follow_the_base_formula() {
    let t = reveal_timing(&[TimedContent::Plain; 4], &cfg());
    assert_eq!(t.appear, Millis(1200));
    assert_eq!(t.hide, Millis(600));

    let single = reveal_timing(&[TimedContent::Plain], &cfg());
    assert_eq!((single.appear, single.hide), (Millis(600), Millis(300)));
    assert_eq!(reveal_timing(&[], &cfg()), RevealTiming::default());
}

#[test]
fn content_delay_is_the_maximum_not_the_sum() {
    let t = reveal_timing(
        &[TimedContent::Callout, TimedContent::Progress, TimedContent::Plain],
        &cfg(),
    );
    assert_eq!(t.appear, Millis(600 + 400 + 800));
    assert_eq!(t.hide, Millis(500));
}

#[test]
fn grid_and_list_delays() {
    let c = cfg();
    let pie = TimedContent::Chart {
        bar_or_line: false,
        rows: 3,
        columns: 2,
    };
    assert_eq!(pie.extra_delay(&c), 410 + 6 * 50);
    let bar = TimedContent::Chart {
        bar_or_line: true,
        rows: 3,
        columns: 2,
    };
    assert_eq!(bar.extra_delay(&c), 0);
    assert_eq!(TimedContent::Table { rows: 2, columns: 2 }.extra_delay(&c), 610);
    assert_eq!(TimedContent::Table { rows: 20, columns: 9 }.extra_delay(&c), 1000);
    assert_eq!(TimedContent::Timeline { rows: 4 }.extra_delay(&c), 450);
    assert_eq!(TimedContent::Timeline { rows: 15 }.extra_delay(&c), 1000);
    assert_eq!(TimedContent::Timeline { rows: 0 }.extra_delay(&c), 300);
}
