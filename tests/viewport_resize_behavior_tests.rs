use timeline_rs::TimelineError;
use timeline_rs::api::{TimelineConfig, TimelineEngine};
use timeline_rs::core::{SECONDS_PER_DAY, TimeSpan, ViewportSize};
use timeline_rs::render::NullRenderer;

fn engine() -> TimelineEngine<NullRenderer> {
    let viewport = ViewportSize::new(800, 400).expect("viewport");
    let span = TimeSpan::new(0.0, 2.0 * SECONDS_PER_DAY).expect("span");
    let config = TimelineConfig::new(viewport, span);
    TimelineEngine::new(NullRenderer::default(), config).expect("engine init")
}

#[test]
fn resize_preserves_the_visible_span() {
    let mut engine = engine();
    let before = engine.visible_span();

    engine.resize(1_200, 500).expect("resize");
    assert_eq!(engine.visible_span(), before);
    assert_eq!(engine.viewport().width(), 1_200);
    assert_eq!(engine.viewport().height(), 500);
}

#[test]
fn resize_remaps_pixels_to_the_new_plot_width() {
    let mut engine = engine();
    let span = engine.visible_span();

    engine.resize(1_200, 500).expect("resize");
    // Margins are 90 left and 15 right, so the end of the span sits at
    // the new plot's right edge.
    let plot_right = 1_200.0 - 15.0;
    assert!((engine.time_to_pixel(span.end()) - plot_right).abs() <= 1e-9);
    assert!((engine.time_to_pixel(span.start()) - 90.0).abs() <= 1e-9);
    assert!((engine.time_to_pixel(span.midpoint()) - (90.0 + plot_right) / 2.0).abs() <= 1e-9);
}

#[test]
fn resize_rejects_zero_dimensions() {
    let mut engine = engine();
    let err = engine.resize(0, 400).expect_err("zero width must fail");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));
    assert!(engine.resize(800, 0).is_err());
    // The engine keeps its previous viewport after a failed resize.
    assert_eq!(engine.viewport().width(), 800);
}

#[test]
fn resize_rejects_viewports_swallowed_by_margins() {
    let mut engine = engine();
    // Narrower than the 105px of horizontal margin.
    let err = engine.resize(100, 400).expect_err("no plot area");
    assert!(matches!(err, TimelineError::InvalidData(_)));
    // Shorter than the 35px of vertical margin.
    assert!(engine.resize(800, 30).is_err());
}

#[test]
fn render_after_resize_uses_the_new_geometry() {
    let mut engine = engine();
    engine.render().expect("first render");

    engine.resize(1_024, 600).expect("resize");
    engine.render().expect("render after resize");
    assert!(engine.renderer().last_rect_count >= 1);
    assert!(engine.renderer().last_line_count >= 4);
}
