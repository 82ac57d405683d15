use chrono::{TimeZone, Utc};
use timeline_rs::api::{
    TICK_TARGET_SPACING_PX, TickLabelFormats, TickResolution, day_name_label, main_tick_label,
    time_ticks,
};
use timeline_rs::core::TimeSpan;

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> f64 {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid utc datetime")
        .timestamp() as f64
}

fn two_day_ticks() -> Vec<f64> {
    let window = TimeSpan::new(ts(2016, 1, 5, 0, 0, 0), ts(2016, 1, 7, 0, 0, 0)).expect("span");
    time_ticks(window, 720.0, TICK_TARGET_SPACING_PX).expect("ticks")
}

#[test]
fn labels_over_a_two_day_window_mix_resolutions() {
    let formats = TickLabelFormats::default();
    let labels: Vec<String> = two_day_ticks()
        .iter()
        .map(|&tick| main_tick_label(tick, &formats).expect("label"))
        .collect();

    // Six-hour cadence: midnight ticks take the day form, the rest the
    // hour form with a space-padded twelve-hour clock.
    assert_eq!(
        labels,
        vec![
            "Jan 5", " 6 AM", "12 PM", " 6 PM", "Jan 6", " 6 AM", "12 PM", " 6 PM", "Jan 7",
        ]
    );
}

#[test]
fn day_name_overlay_marks_only_midnight_ticks() {
    let names: Vec<Option<String>> = two_day_ticks()
        .iter()
        .map(|&tick| day_name_label(tick).expect("label"))
        .collect();

    let day = |name: &str| Some(name.to_owned());
    assert_eq!(
        names,
        vec![
            day("Tue"),
            None,
            None,
            None,
            day("Wed"),
            None,
            None,
            None,
            day("Thu"),
        ]
    );
}

#[test]
fn finer_and_coarser_slots_have_their_own_labels() {
    let formats = TickLabelFormats::default();
    let cases = [
        (ts(2016, 6, 15, 9, 30, 15), ":15"),
        (ts(2016, 6, 15, 9, 30, 0), " 9:30"),
        // 2016-02-07 is a Sunday mid-month.
        (ts(2016, 2, 7, 0, 0, 0), "Feb 7"),
        (ts(2016, 6, 1, 0, 0, 0), "Jun"),
    ];
    for (timestamp, expected) in cases {
        assert_eq!(
            main_tick_label(timestamp, &formats).expect("label"),
            expected
        );
    }
}

#[test]
fn custom_patterns_replace_the_defaults() {
    let formats = TickLabelFormats {
        hour: "%H:%M".to_owned(),
        ..TickLabelFormats::default()
    };
    formats.validate().expect("patterns valid");
    assert_eq!(formats.pattern_for(TickResolution::Hour), "%H:%M");
    assert_eq!(
        main_tick_label(ts(2016, 6, 15, 9, 0, 0), &formats).expect("label"),
        "09:00"
    );
}
