//! Frame assembly: turns engine state into an ordered primitive batch.
//!
//! Geometry is projected in plot-local coordinates by the core layer and
//! offset into viewport coordinates here, so everything downstream of
//! this module (retained scene, hit-testing, backends) works in one
//! coordinate space. Series shapes pass through the retained scene's
//! enter/update/exit join; chrome (background, rulers, lane furniture)
//! is rebuilt from scratch every frame.

use crate::api::rulers::TickRuler;
use crate::api::tick_cadence::{
    TICK_TARGET_SPACING_PX, day_boundaries, time_ticks, week_boundaries,
};
use crate::api::tick_format::{day_name_label, main_tick_label, value_axis_label};
use crate::core::feed::{Feed, FeedRegistry};
use crate::core::lane::{LaneBand, LaneLayoutConfig, ValueScale, layout_lanes, nice_value_ticks};
use crate::core::night::{NightShadeConfig, night_intervals};
use crate::core::project::{project_day_bars, project_point_dots, project_trend_segments};
use crate::core::scale::TimePixelScale;
use crate::core::span::{SECONDS_PER_DAY, TimeSpan};
use crate::core::types::{FeedShape, ViewportSize};
use crate::error::{TimelineError, TimelineResult};
use crate::render::{
    CirclePrimitive, JoinStats, LinePrimitive, RectPrimitive, RenderFrame, RenderStyle,
    RetainedScene, SceneShape, TextHAlign, TextPrimitive,
};

use super::Margins;
use super::rulers::RulerVisibilityPolicy;
use super::tick_format::TickLabelFormats;

/// SVG text anchors at the baseline; this nudges a label down to
/// optically center it on its anchor row.
const TEXT_BASELINE_CENTER_FACTOR: f64 = 0.32;

/// Everything the builder reads; all state is borrowed from the engine.
pub(super) struct SceneContext<'a> {
    pub registry: &'a FeedRegistry,
    pub scale: TimePixelScale,
    pub viewport: ViewportSize,
    pub margins: Margins,
    pub rulers: &'a RulerVisibilityPolicy,
    pub formats: &'a TickLabelFormats,
    pub night: &'a NightShadeConfig,
    pub lanes: &'a LaneLayoutConfig,
    pub style: &'a RenderStyle,
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn right(self) -> f64 {
        self.left + self.width
    }

    fn bottom(self) -> f64 {
        self.top + self.height
    }
}

/// Builds the full frame for one render pass, reconciling series shapes
/// through `scene` so join stats stay meaningful across passes.
pub(super) fn build_render_frame(
    ctx: &SceneContext<'_>,
    scene: &mut RetainedScene,
) -> TimelineResult<(RenderFrame, JoinStats)> {
    let plot = plot_area(ctx)?;
    let bands = layout_lanes(plot.height, ctx.registry.len(), ctx.lanes)?;

    let mut frame = RenderFrame::new(ctx.viewport);
    frame.rects.push(RectPrimitive::new(
        0.0,
        0.0,
        ctx.viewport.width_px(),
        ctx.viewport.height_px(),
        ctx.style.background_color,
    ));

    push_night_shading(&mut frame, ctx, plot)?;
    push_lane_chrome(&mut frame, ctx, plot, &bands)?;
    push_rulers(&mut frame, ctx, plot)?;
    push_plot_border(&mut frame, ctx, plot);

    let stats = reconcile_series(ctx, scene, plot, &bands)?;
    push_scene_shapes(&mut frame, scene);

    Ok((frame, stats))
}

fn plot_area(ctx: &SceneContext<'_>) -> TimelineResult<PlotArea> {
    let width = ctx.viewport.width_px() - ctx.margins.left - ctx.margins.right;
    let height = ctx.viewport.height_px() - ctx.margins.top - ctx.margins.bottom;
    if width <= 0.0 || height <= 0.0 {
        return Err(TimelineError::InvalidData(format!(
            "margins leave no plot area inside a {}x{} viewport",
            ctx.viewport.width(),
            ctx.viewport.height()
        )));
    }
    Ok(PlotArea {
        left: ctx.margins.left,
        top: ctx.margins.top,
        width,
        height,
    })
}

/// Dusk-to-dawn shading behind all lanes. Skipped entirely once the
/// visible span is wide enough that the bands would smear together.
fn push_night_shading(
    frame: &mut RenderFrame,
    ctx: &SceneContext<'_>,
    plot: PlotArea,
) -> TimelineResult<()> {
    let visible = ctx.scale.span();
    if !ctx.night.visible_at(visible.span_in_days()) {
        return Ok(());
    }
    let Some(data_span) = ctx.registry.full_span() else {
        return Ok(());
    };

    // Walk only the days overlapping the view; the previous day's dusk
    // interval can still reach into it, so back up one day.
    let start = data_span.start().max(visible.start() - SECONDS_PER_DAY);
    let end = data_span.end().min(visible.end());
    if end <= start {
        return Ok(());
    }
    let window = TimeSpan::new(start, end)?;

    for interval in night_intervals(window, ctx.night)? {
        let left = ctx.scale.time_to_pixel(interval.start()).max(0.0);
        let right = ctx.scale.time_to_pixel(interval.end()).min(plot.width);
        if right <= left {
            continue;
        }
        frame.rects.push(RectPrimitive::new(
            plot.left + left,
            plot.top,
            right - left,
            plot.height,
            ctx.style.night_fill,
        ));
    }
    Ok(())
}

/// Per-lane furniture: top/bottom baselines, the right-anchored feed
/// label, and a value axis for lanes that carry measurements.
fn push_lane_chrome(
    frame: &mut RenderFrame,
    ctx: &SceneContext<'_>,
    plot: PlotArea,
    bands: &[LaneBand],
) -> TimelineResult<()> {
    let style = ctx.style;
    for (feed, &band) in ctx.registry.iter().zip(bands) {
        for y in [band.y_top, band.y_bottom()] {
            frame.lines.push(LinePrimitive::new(
                plot.left,
                plot.top + y,
                plot.right(),
                plot.top + y,
                style.baseline_width,
                style.baseline_color,
            ));
        }

        let label = &feed.descriptor().label;
        if !label.is_empty() {
            frame.texts.push(TextPrimitive::new(
                label.clone(),
                plot.left - style.feed_label_offset_px,
                plot.top + band.y_mid() + style.label_font_size_px * TEXT_BASELINE_CENTER_FACTOR,
                style.label_font_size_px,
                style.label_color,
                TextHAlign::Right,
            ));
        }

        if feed.has_values() {
            let value_scale = lane_value_scale(feed, band)?;
            for tick in nice_value_ticks(
                value_scale.floor(),
                value_scale.ceiling(),
                style.value_tick_count,
            ) {
                let y = plot.top + value_scale.value_to_pixel(tick);
                frame.lines.push(LinePrimitive::new(
                    plot.left,
                    y,
                    plot.left + style.value_tick_length_px,
                    y,
                    style.baseline_width,
                    style.label_color,
                ));
                let text = value_axis_label(tick, value_scale.ceiling());
                if !text.is_empty() {
                    frame.texts.push(TextPrimitive::new(
                        text,
                        plot.left - style.value_label_padding_px,
                        y + style.label_font_size_px * TEXT_BASELINE_CENTER_FACTOR,
                        style.label_font_size_px,
                        style.label_color,
                        TextHAlign::Right,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Gridlines and labels for whichever rulers survive at this zoom. The
/// yearly stand-in draws nothing; it only holds the slot.
fn push_rulers(
    frame: &mut RenderFrame,
    ctx: &SceneContext<'_>,
    plot: PlotArea,
) -> TimelineResult<()> {
    let style = ctx.style;
    let visible = ctx.scale.span();

    for ruler in ctx.rulers.select_rulers(visible.span_in_days()) {
        match ruler {
            TickRuler::MainLabel => {
                for tick in time_ticks(visible, plot.width, TICK_TARGET_SPACING_PX)? {
                    let x = plot.left + ctx.scale.time_to_pixel(tick);
                    frame.lines.push(LinePrimitive::new(
                        x,
                        plot.top,
                        x,
                        plot.bottom(),
                        style.main_tick_width,
                        style.main_tick_color,
                    ));
                    let label = main_tick_label(tick, ctx.formats)?;
                    if !label.is_empty() {
                        frame.texts.push(TextPrimitive::new(
                            label,
                            x,
                            plot.bottom() + style.main_label_padding_px + style.label_font_size_px,
                            style.label_font_size_px,
                            style.label_color,
                            TextHAlign::Center,
                        ));
                    }
                }
            }
            TickRuler::DayName => {
                for tick in time_ticks(visible, plot.width, TICK_TARGET_SPACING_PX)? {
                    let Some(name) = day_name_label(tick)? else {
                        continue;
                    };
                    frame.texts.push(TextPrimitive::new(
                        name,
                        plot.left + ctx.scale.time_to_pixel(tick),
                        plot.bottom()
                            + style.day_name_label_padding_px
                            + style.label_font_size_px,
                        style.label_font_size_px,
                        style.label_color,
                        TextHAlign::Center,
                    ));
                }
            }
            TickRuler::DayGrid => {
                for tick in day_boundaries(visible)? {
                    let x = plot.left + ctx.scale.time_to_pixel(tick);
                    frame.lines.push(LinePrimitive::new(
                        x,
                        plot.top,
                        x,
                        plot.bottom(),
                        style.day_grid_width,
                        style.day_grid_color,
                    ));
                }
            }
            TickRuler::WeekGrid => {
                for tick in week_boundaries(visible)? {
                    let x = plot.left + ctx.scale.time_to_pixel(tick);
                    frame.lines.push(LinePrimitive::new(
                        x,
                        plot.top,
                        x,
                        plot.bottom(),
                        style.week_grid_width,
                        style.week_grid_color,
                    ));
                }
            }
            TickRuler::HiddenYearly => {}
        }
    }
    Ok(())
}

fn push_plot_border(frame: &mut RenderFrame, ctx: &SceneContext<'_>, plot: PlotArea) {
    let style = ctx.style;
    let edges = [
        (plot.left, plot.top, plot.right(), plot.top),
        (plot.left, plot.bottom(), plot.right(), plot.bottom()),
        (plot.left, plot.top, plot.left, plot.bottom()),
        (plot.right(), plot.top, plot.right(), plot.bottom()),
    ];
    for (x1, y1, x2, y2) in edges {
        frame.lines.push(LinePrimitive::new(
            x1,
            y1,
            x2,
            y2,
            style.frame_border_width,
            style.frame_border_color,
        ));
    }
}

/// Projects every feed's samples and runs them through the retained
/// scene's keyed join. Returns per-pass stats summed over all feeds.
///
/// Samples outside the visible span still project (off-plot) rather than
/// being culled, so panning alone never produces enters or exits.
fn reconcile_series(
    ctx: &SceneContext<'_>,
    scene: &mut RetainedScene,
    plot: PlotArea,
    bands: &[LaneBand],
) -> TimelineResult<JoinStats> {
    let mut total = JoinStats::default();
    for (feed, &band) in ctx.registry.iter().zip(bands) {
        let value_scale = lane_value_scale(feed, band)?;
        let incoming = project_feed_shapes(ctx, feed, value_scale, plot)?;
        let stats = scene.reconcile_feed(feed.id(), &incoming);
        total.entered += stats.entered;
        total.updated += stats.updated;
        total.exited += stats.exited;
    }
    Ok(total)
}

fn project_feed_shapes(
    ctx: &SceneContext<'_>,
    feed: &Feed,
    value_scale: ValueScale,
    plot: PlotArea,
) -> TimelineResult<Vec<(f64, SceneShape)>> {
    let style = ctx.style;
    let mut incoming = Vec::with_capacity(feed.samples().len());

    match feed.descriptor().shape {
        FeedShape::Points => {
            push_dots(&mut incoming, ctx, feed, value_scale, plot);
        }
        FeedShape::Bars => {
            for bar in project_day_bars(feed, ctx.scale, value_scale, style.bar_gap_px)? {
                let rect = RectPrimitive::new(
                    plot.left + bar.x_left,
                    plot.top + bar.y_top,
                    bar.x_right - bar.x_left,
                    bar.y_bottom - bar.y_top,
                    style.bar_fill,
                );
                incoming.push((bar.day_start, SceneShape::Bar(rect)));
            }
        }
        FeedShape::Line => {
            for segment in project_trend_segments(feed, ctx.scale, value_scale) {
                let line = LinePrimitive::new(
                    plot.left + segment.x1,
                    plot.top + segment.y1,
                    plot.left + segment.x2,
                    plot.top + segment.y2,
                    style.trend_width,
                    style.trend_color,
                );
                incoming.push((segment.from_timestamp, SceneShape::Segment(line)));
            }
            push_dots(&mut incoming, ctx, feed, value_scale, plot);
        }
    }
    Ok(incoming)
}

fn push_dots(
    incoming: &mut Vec<(f64, SceneShape)>,
    ctx: &SceneContext<'_>,
    feed: &Feed,
    value_scale: ValueScale,
    plot: PlotArea,
) {
    let style = ctx.style;
    let event_feed = !feed.has_values();
    for dot in project_point_dots(feed, ctx.scale, value_scale) {
        let (radius, color) = if !dot.valid {
            (
                style.invalid_point_radius_px,
                style.point_color.with_alpha(style.invalid_point_alpha),
            )
        } else if event_feed {
            (style.event_point_radius_px, style.event_point_color)
        } else {
            (style.point_radius_px, style.point_color)
        };
        let circle = CirclePrimitive::new(plot.left + dot.x, plot.top + dot.y, radius, color);
        incoming.push((dot.timestamp, SceneShape::Dot(circle)));
    }
}

fn push_scene_shapes(frame: &mut RenderFrame, scene: &RetainedScene) {
    for (_, shape) in scene.shapes() {
        match shape {
            SceneShape::Dot(circle) => frame.circles.push(*circle),
            SceneShape::Bar(rect) => frame.rects.push(*rect),
            SceneShape::Segment(line) => frame.lines.push(*line),
        }
    }
}

fn lane_value_scale(feed: &Feed, band: LaneBand) -> TimelineResult<ValueScale> {
    let floor = feed.descriptor().min_valid_value.unwrap_or(0.0);
    let ceiling = feed.value_ceiling().unwrap_or(floor + 1.0);
    ValueScale::new(floor, ceiling, band)
}
