use chrono::{TimeZone, Utc};
use timeline_rs::api::{TimelineConfig, TimelineEngine};
use timeline_rs::core::{FeedDescriptor, FeedShape, Sample, TimeSpan, ViewportSize};
use timeline_rs::error::TimelineError;
use timeline_rs::render::NullRenderer;

const WIDE_RADIUS_PX: f64 = 400.0;

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> f64 {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid utc datetime")
        .timestamp() as f64
}

fn sample(timestamp: f64, value: f64) -> Sample {
    Sample::new(timestamp, value).expect("valid sample")
}

fn engine() -> TimelineEngine<NullRenderer> {
    let viewport = ViewportSize::new(800, 400).expect("viewport");
    let default_span =
        TimeSpan::new(ts(2016, 1, 1, 0, 0), ts(2016, 1, 8, 0, 0)).expect("default span");
    let config = TimelineConfig::new(viewport, default_span).with_tween_duration(0.0);
    TimelineEngine::new(NullRenderer::default(), config).expect("engine")
}

#[test]
fn hovering_a_measurement_dot_shows_date_and_value() {
    let mut engine = engine();
    engine
        .add_feed(
            FeedDescriptor::new("Sleep", FeedShape::Points),
            vec![
                sample(ts(2016, 1, 2, 6, 0), 7.25),
                sample(ts(2016, 1, 4, 6, 0), 8.5),
            ],
        )
        .expect("add feed");
    engine.render().expect("render");

    let hovered = ts(2016, 1, 2, 6, 0);
    let tooltip = engine
        .tooltip_at(engine.time_to_pixel(hovered), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");

    assert_eq!(tooltip.feed_label, "Sleep");
    assert_eq!(tooltip.timestamp, hovered);
    assert_eq!(tooltip.rows, vec!["Sat Jan  2, 2016", "7.25"]);
    assert!((tooltip.x_px - engine.time_to_pixel(hovered)).abs() <= 1e-9);
}

#[test]
fn suppressed_readings_read_missing() {
    let mut engine = engine();
    engine
        .add_feed(
            FeedDescriptor::new("Sleep", FeedShape::Points).with_min_valid_value(2.0),
            vec![
                sample(ts(2016, 1, 2, 6, 0), 7.25),
                sample(ts(2016, 1, 4, 6, 0), 2.0),
            ],
        )
        .expect("add feed");
    engine.render().expect("render");

    let tooltip = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 4, 6, 0)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");

    assert_eq!(tooltip.rows, vec!["Mon Jan  4, 2016", "Missing"]);
}

#[test]
fn event_dots_show_a_single_datetime_row() {
    let mut engine = engine();
    engine
        .add_events("Walks", &[ts(2016, 1, 3, 15, 0), ts(2016, 1, 5, 9, 30)])
        .expect("add events");
    engine.render().expect("render");

    let tooltip = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 3, 15, 0)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");
    assert_eq!(tooltip.rows, vec!["Sun Jan  3, 2016 at  3:00 PM"]);

    let morning = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 5, 9, 30)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");
    assert_eq!(morning.rows, vec!["Tue Jan  5, 2016 at  9:30 AM"]);
}

#[test]
fn nearest_dot_wins_across_feeds() {
    let mut engine = engine();
    engine
        .add_feed(
            FeedDescriptor::new("Sleep", FeedShape::Points),
            vec![sample(ts(2016, 1, 2, 0, 0), 7.0)],
        )
        .expect("add sleep");
    engine
        .add_feed(
            FeedDescriptor::new("Weight", FeedShape::Points),
            vec![sample(ts(2016, 1, 6, 0, 0), 81.0)],
        )
        .expect("add weight");
    engine.render().expect("render");

    let near_weight = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 6, 0, 0)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");
    assert_eq!(near_weight.feed_label, "Weight");

    let near_sleep = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 2, 0, 0)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test")
        .expect("dot in range");
    assert_eq!(near_sleep.feed_label, "Sleep");
}

#[test]
fn empty_space_and_unrendered_scenes_have_no_tooltip() {
    let mut engine = engine();
    engine
        .add_feed(
            FeedDescriptor::new("Sleep", FeedShape::Points),
            vec![sample(ts(2016, 1, 2, 6, 0), 7.25)],
        )
        .expect("add feed");

    // Nothing has been projected yet.
    assert!(engine.tooltip_at(400.0, 200.0, 8.0).expect("hit test").is_none());

    engine.render().expect("render");
    let far_corner = engine.tooltip_at(2.0, 2.0, 8.0).expect("hit test");
    assert!(far_corner.is_none());
}

#[test]
fn bars_and_segments_are_not_hit_targets() {
    let mut engine = engine();
    engine
        .add_feed(
            FeedDescriptor::new("Steps", FeedShape::Bars),
            vec![sample(ts(2016, 1, 2, 12, 0), 4_200.0)],
        )
        .expect("add feed");
    engine.render().expect("render");

    let over_the_bar = engine
        .tooltip_at(engine.time_to_pixel(ts(2016, 1, 2, 12, 0)), 200.0, WIDE_RADIUS_PX)
        .expect("hit test");
    assert!(over_the_bar.is_none());
}

#[test]
fn degenerate_hit_test_inputs_are_rejected() {
    let engine = engine();
    for (x, y, radius) in [
        (f64::NAN, 200.0, 8.0),
        (400.0, f64::INFINITY, 8.0),
        (400.0, 200.0, 0.0),
        (400.0, 200.0, -4.0),
    ] {
        let error = engine.tooltip_at(x, y, radius).expect_err("must be rejected");
        assert!(matches!(error, TimelineError::InvalidData(_)));
    }
}
