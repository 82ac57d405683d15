use timeline_rs::api::{TimelineConfig, TimelineEngine, ViewportController, ZoomPolicy};
use timeline_rs::core::{SECONDS_PER_DAY, TimeSpan, ViewportSize};
use timeline_rs::render::NullRenderer;

fn day_span(start_day: f64, end_day: f64) -> TimeSpan {
    TimeSpan::new(start_day * SECONDS_PER_DAY, end_day * SECONDS_PER_DAY).expect("valid span")
}

fn controller() -> ViewportController {
    let mut controller =
        ViewportController::new(day_span(0.0, 1.0), 864.0, ZoomPolicy::default())
            .expect("controller");
    controller.set_reference_span(day_span(0.0, 4.0));
    controller
}

#[test]
fn reset_tween_interpolates_linearly() {
    let mut controller = controller();
    let target = day_span(1.0, 3.0);
    controller
        .begin_span_reset(target, 0.45)
        .expect("begin reset");
    assert!(controller.is_animating());
    // Nothing moves until the host steps the animation.
    assert_eq!(controller.visible_span(), day_span(0.0, 1.0));

    let progress = controller
        .step_animation(0.225)
        .expect("step")
        .expect("tween running");
    assert!(!progress.completed);
    assert!((progress.span.start() - 0.5 * SECONDS_PER_DAY).abs() <= 1e-9);
    assert!((progress.span.end() - 2.0 * SECONDS_PER_DAY).abs() <= 1e-9);
    assert_eq!(controller.visible_span(), progress.span);

    let progress = controller
        .step_animation(0.225)
        .expect("step")
        .expect("tween running");
    assert!(progress.completed);
    assert_eq!(progress.span, target);
    assert!(!controller.is_animating());
}

#[test]
fn oversized_step_lands_exactly_on_the_target() {
    let mut controller = controller();
    let target = day_span(2.0, 4.0);
    controller
        .begin_span_reset(target, 0.45)
        .expect("begin reset");

    let progress = controller
        .step_animation(10.0)
        .expect("step")
        .expect("tween running");
    assert!(progress.completed);
    assert_eq!(progress.span, target);
    assert_eq!(controller.visible_span(), target);
}

#[test]
fn newest_reset_wins_mid_flight() {
    let mut controller = controller();
    controller
        .begin_span_reset(day_span(2.0, 4.0), 0.45)
        .expect("first reset");
    controller.step_animation(0.09).expect("partial step");

    // Retarget while the first tween is still running.
    let second = day_span(0.0, 2.0);
    controller
        .begin_span_reset(second, 0.45)
        .expect("second reset");
    let progress = controller
        .step_animation(0.45)
        .expect("step")
        .expect("tween running");
    assert!(progress.completed);
    assert_eq!(progress.span, second);
}

#[test]
fn retargeted_tween_starts_from_the_interpolated_span() {
    let mut controller = controller();
    controller
        .begin_span_reset(day_span(2.0, 4.0), 0.45)
        .expect("first reset");
    let mid = controller
        .step_animation(0.225)
        .expect("step")
        .expect("tween running")
        .span;

    controller
        .begin_span_reset(day_span(0.0, 1.0), 0.45)
        .expect("second reset");
    // A zero-length step reports the tween origin, which is the span the
    // first tween had reached.
    let origin = controller
        .step_animation(0.0)
        .expect("step")
        .expect("tween running")
        .span;
    assert!((origin.start() - mid.start()).abs() <= 1e-9);
    assert!((origin.end() - mid.end()).abs() <= 1e-9);
}

#[test]
fn zero_duration_reset_lands_immediately() {
    let mut controller = controller();
    let target = day_span(1.0, 2.0);
    controller.begin_span_reset(target, 0.0).expect("reset");
    assert!(!controller.is_animating());
    assert_eq!(controller.visible_span(), target);
    assert!(controller.step_animation(0.1).expect("step").is_none());
}

#[test]
fn gestures_cancel_a_running_tween() {
    let mut controller = controller();
    controller
        .begin_span_reset(day_span(2.0, 4.0), 0.45)
        .expect("reset");
    assert!(controller.is_animating());

    controller.pan_by_pixels(10.0).expect("pan");
    assert!(!controller.is_animating());
    assert!(controller.step_animation(0.1).expect("step").is_none());

    controller
        .begin_span_reset(day_span(2.0, 4.0), 0.45)
        .expect("reset again");
    controller.zoom_around_pixel(2.0, 432.0).expect("zoom");
    assert!(!controller.is_animating());
}

#[test]
fn invalid_durations_and_steps_are_rejected() {
    let mut controller = controller();
    assert!(
        controller
            .begin_span_reset(day_span(1.0, 2.0), -0.1)
            .is_err()
    );
    assert!(
        controller
            .begin_span_reset(day_span(1.0, 2.0), f64::NAN)
            .is_err()
    );

    controller
        .begin_span_reset(day_span(1.0, 2.0), 0.45)
        .expect("reset");
    assert!(controller.step_animation(-0.1).is_err());
    assert!(controller.step_animation(f64::INFINITY).is_err());
}

#[test]
fn engine_zoom_to_sample_frames_a_day_window() {
    let viewport = ViewportSize::new(800, 400).expect("viewport");
    let span = day_span(0.0, 7.0);
    let config = TimelineConfig::new(viewport, span).with_tween_duration(0.0);
    let mut engine = TimelineEngine::new(NullRenderer::default(), config).expect("engine init");

    let clicked = 3.5 * SECONDS_PER_DAY;
    let naps = engine.add_events("Naps", &[clicked]).expect("register feed");
    engine.zoom_to_sample(naps, clicked).expect("zoom to sample");

    let visible = engine.visible_span();
    assert!((visible.start() - (clicked - 12.0 * 3_600.0)).abs() <= 1e-9);
    assert!((visible.end() - (clicked + 12.0 * 3_600.0)).abs() <= 1e-9);

    assert!(engine.zoom_to_sample(naps, f64::NAN).is_err());

    // A removed feed leaves a stale handle behind.
    engine.remove_feed(naps).expect("remove feed");
    assert!(engine.zoom_to_sample(naps, clicked).is_err());
}

#[test]
fn engine_reset_to_reference_reframes_all_data() {
    let viewport = ViewportSize::new(800, 400).expect("viewport");
    let config = TimelineConfig::new(viewport, day_span(0.0, 7.0)).with_tween_duration(0.45);
    let mut engine = TimelineEngine::new(NullRenderer::default(), config).expect("engine init");

    engine.zoom_around_pixel(8.0, 400.0).expect("zoom in");
    let narrowed = engine.visible_span();
    assert!(narrowed.duration_seconds() < 7.0 * SECONDS_PER_DAY);

    engine.reset_to_reference().expect("reset");
    assert!(engine.is_animating());
    let landed = engine
        .step_animation(0.45)
        .expect("step")
        .expect("tween running");
    assert_eq!(landed, engine.reference_span());
    assert!(engine.step_animation(0.1).expect("idle").is_none());
}
