//! Engine facade: feeds, viewport navigation, and rendering behind one type.

mod events;
mod rulers;
mod scene_builder;
mod snapshot;
mod tick_cadence;
mod tick_format;
mod tooltip;
mod viewport_controller;

pub use events::{TimelineContext, TimelineEvent, TimelineObserver};
pub use rulers::{RulerVisibilityPolicy, TickRuler};
pub use snapshot::{
    FeedSnapshot, TIMELINE_SNAPSHOT_JSON_SCHEMA_V1, TimelineSnapshot,
    TimelineSnapshotJsonContractV1,
};
pub use tick_cadence::{
    TICK_TARGET_SPACING_PX, TickStep, TickUnit, day_boundaries, select_tick_step, tick_instants,
    time_ticks, week_boundaries, year_boundaries,
};
pub use tick_format::{
    TOOLTIP_DATE_FORMAT, TOOLTIP_DATE_TIME_FORMAT, TickLabelFormats, TickResolution, classify_tick,
    day_name_label, main_tick_label, tooltip_date_label, tooltip_date_time_label, value_axis_label,
};
pub use tooltip::TooltipModel;
pub use viewport_controller::{TweenProgress, ViewportController, ZoomPolicy};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::feed::{Feed, FeedDescriptor, FeedId, FeedRegistry};
use crate::core::lane::LaneLayoutConfig;
use crate::core::night::NightShadeConfig;
use crate::core::span::TimeSpan;
use crate::core::types::{FeedShape, Sample, ViewportSize};
use crate::error::{TimelineError, TimelineResult};
use crate::render::{JoinStats, RenderStyle, Renderer, RetainedScene};

use scene_builder::{SceneContext, build_render_frame};

/// Default duration of the animated span reset.
pub const DEFAULT_TWEEN_DURATION_SECONDS: f64 = 0.45;

/// Half-width of the window framed around a clicked sample.
const CLICK_ZOOM_HALF_WINDOW_SECONDS: f64 = 12.0 * 3_600.0;

/// Outer margins between the viewport edge and the plot area, in pixels.
/// The wide left margin hosts feed labels and lane value axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 5.0,
            right: 15.0,
            bottom: 30.0,
            left: 90.0,
        }
    }
}

impl Margins {
    pub fn validate(self) -> TimelineResult<Self> {
        for (edge, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "{edge} margin must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub viewport: ViewportSize,
    /// Span shown before any feed is added; also the reference span
    /// fallback once all feeds are removed.
    pub default_span: TimeSpan,
    pub margins: Margins,
    /// Seconds a programmatic span reset takes to settle.
    pub tween_duration_seconds: f64,
    pub zoom: ZoomPolicy,
    pub rulers: RulerVisibilityPolicy,
    pub night: NightShadeConfig,
    pub lanes: LaneLayoutConfig,
    pub formats: TickLabelFormats,
}

impl TimelineConfig {
    #[must_use]
    pub fn new(viewport: ViewportSize, default_span: TimeSpan) -> Self {
        Self {
            viewport,
            default_span,
            margins: Margins::default(),
            tween_duration_seconds: DEFAULT_TWEEN_DURATION_SECONDS,
            zoom: ZoomPolicy::default(),
            rulers: RulerVisibilityPolicy::default(),
            night: NightShadeConfig::default(),
            lanes: LaneLayoutConfig::default(),
            formats: TickLabelFormats::default(),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_tween_duration(mut self, seconds: f64) -> Self {
        self.tween_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_zoom_policy(mut self, zoom: ZoomPolicy) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_ruler_policy(mut self, rulers: RulerVisibilityPolicy) -> Self {
        self.rulers = rulers;
        self
    }

    #[must_use]
    pub fn with_night_shading(mut self, night: NightShadeConfig) -> Self {
        self.night = night;
        self
    }

    #[must_use]
    pub fn with_lane_layout(mut self, lanes: LaneLayoutConfig) -> Self {
        self.lanes = lanes;
        self
    }

    #[must_use]
    pub fn with_label_formats(mut self, formats: TickLabelFormats) -> Self {
        self.formats = formats;
        self
    }

    /// Width of the plot area between the left and right margins.
    #[must_use]
    pub fn plot_width_px(&self) -> f64 {
        self.viewport.width_px() - self.margins.left - self.margins.right
    }

    /// Height of the plot area between the top and bottom margins.
    #[must_use]
    pub fn plot_height_px(&self) -> f64 {
        self.viewport.height_px() - self.margins.top - self.margins.bottom
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if self.viewport.width() == 0 || self.viewport.height() == 0 {
            return Err(TimelineError::InvalidViewport {
                width: self.viewport.width(),
                height: self.viewport.height(),
            });
        }
        self.margins.validate()?;
        if self.plot_width_px() <= 0.0 || self.plot_height_px() <= 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "margins leave no plot area inside a {}x{} viewport",
                self.viewport.width(),
                self.viewport.height()
            )));
        }
        if self.default_span.end() <= self.default_span.start() {
            return Err(TimelineError::InvalidData(
                "default span must run forward".to_owned(),
            ));
        }
        if !self.tween_duration_seconds.is_finite() || self.tween_duration_seconds < 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "tween duration must be finite and non-negative, got {}",
                self.tween_duration_seconds
            )));
        }
        self.zoom.validate()?;
        self.rulers.validate()?;
        self.night.validate()?;
        self.lanes.validate()?;
        self.formats.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize config json: {e}")))
    }

    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidData(format!("failed to parse config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Timeline widget engine, generic over the render backend.
///
/// All state lives behind this facade: the feed registry, the viewport
/// controller with its tween, the retained scene, and registered
/// observers. Hosts drive it with feed edits, gestures, `step_animation`
/// calls, and `render`.
pub struct TimelineEngine<R: Renderer> {
    renderer: R,
    config: TimelineConfig,
    style: RenderStyle,
    registry: FeedRegistry,
    scene: RetainedScene,
    controller: ViewportController,
    observers: Vec<Box<dyn TimelineObserver>>,
    last_join_stats: JoinStats,
}

impl<R: Renderer> TimelineEngine<R> {
    pub fn new(renderer: R, config: TimelineConfig) -> TimelineResult<Self> {
        config.validate()?;
        let controller =
            ViewportController::new(config.default_span, config.plot_width_px(), config.zoom)?;
        Ok(Self {
            renderer,
            config,
            style: RenderStyle::default(),
            registry: FeedRegistry::new(),
            scene: RetainedScene::new(),
            controller,
            observers: Vec::new(),
            last_join_stats: JoinStats::default(),
        })
    }

    /// Registers a feed, rebases the reference span on the union of feed
    /// extents, and starts an animated reset framing it.
    pub fn add_feed(
        &mut self,
        descriptor: FeedDescriptor,
        samples: Vec<Sample>,
    ) -> TimelineResult<FeedId> {
        let id = self.registry.add_feed(descriptor, samples)?;
        self.recompute_reference();
        let reference = self.controller.reference_span();
        self.notify(TimelineEvent::FeedAdded { feed: id });
        self.start_reset(reference)?;
        Ok(id)
    }

    /// Registers a feed of bare occurrence timestamps rendered as
    /// markers at mid-lane.
    pub fn add_events(
        &mut self,
        label: impl Into<String>,
        timestamps: &[f64],
    ) -> TimelineResult<FeedId> {
        let samples = timestamps
            .iter()
            .map(|&timestamp| Sample::missing(timestamp))
            .collect::<TimelineResult<Vec<_>>>()?;
        self.add_feed(FeedDescriptor::new(label, FeedShape::Points), samples)
    }

    /// Replaces a feed's samples. The viewport stays where the user put
    /// it; the next render reconciles the lane's shapes.
    pub fn update_feed(&mut self, id: FeedId, samples: Vec<Sample>) -> TimelineResult<()> {
        self.registry.update_feed(id, samples)?;
        self.recompute_reference();
        Ok(())
    }

    pub fn remove_feed(&mut self, id: FeedId) -> TimelineResult<()> {
        self.registry.remove_feed(id)?;
        self.scene.remove_feed(id);
        self.recompute_reference();
        self.notify(TimelineEvent::FeedRemoved { feed: id });
        Ok(())
    }

    /// Shifts the view by `delta_px`; positive deltas move toward later
    /// times.
    pub fn pan_by_pixels(&mut self, delta_px: f64) -> TimelineResult<TimeSpan> {
        let span = self.controller.pan_by_pixels(delta_px)?;
        self.notify_span_changed(span);
        Ok(span)
    }

    /// Rescales the view by `factor` about the instant under the
    /// viewport x position `anchor_px`; factors above one zoom in.
    pub fn zoom_around_pixel(&mut self, factor: f64, anchor_px: f64) -> TimelineResult<TimeSpan> {
        let anchor_plot_px = anchor_px - self.config.margins.left;
        let span = self.controller.zoom_around_pixel(factor, anchor_plot_px)?;
        self.notify_span_changed(span);
        Ok(span)
    }

    /// Starts an animated reset of the view to `target`.
    pub fn begin_span_reset(&mut self, target: TimeSpan) -> TimelineResult<()> {
        self.start_reset(target)
    }

    /// Frames the union of all feed extents with an animated reset.
    pub fn reset_to_reference(&mut self) -> TimelineResult<()> {
        let reference = self.controller.reference_span();
        self.start_reset(reference)
    }

    /// Frames a half-day window either side of a clicked sample. The
    /// feed handle identifies which lane was clicked; stale handles are
    /// rejected.
    pub fn zoom_to_sample(&mut self, id: FeedId, timestamp: f64) -> TimelineResult<()> {
        if self.registry.get(id).is_none() {
            return Err(TimelineError::InvalidData(format!(
                "unknown feed id {}",
                id.index()
            )));
        }
        if !timestamp.is_finite() {
            return Err(TimelineError::InvalidData(format!(
                "sample timestamp must be finite, got {timestamp}"
            )));
        }
        let target = TimeSpan::new(
            timestamp - CLICK_ZOOM_HALF_WINDOW_SECONDS,
            timestamp + CLICK_ZOOM_HALF_WINDOW_SECONDS,
        )?;
        self.start_reset(target)
    }

    /// Advances an in-flight reset tween by `delta_seconds` of wall
    /// time. Returns the interpolated span, or `None` when idle.
    pub fn step_animation(&mut self, delta_seconds: f64) -> TimelineResult<Option<TimeSpan>> {
        let Some(progress) = self.controller.step_animation(delta_seconds)? else {
            return Ok(None);
        };
        self.notify_span_changed(progress.span);
        if progress.completed {
            self.notify(TimelineEvent::TweenCompleted);
        }
        Ok(Some(progress.span))
    }

    /// Adopts a new viewport size, preserving the visible span.
    pub fn resize(&mut self, width: u32, height: u32) -> TimelineResult<()> {
        self.set_viewport(ViewportSize::new(width, height)?)
    }

    /// Adopts an already-validated viewport size, preserving the visible
    /// span.
    pub fn set_viewport(&mut self, viewport: ViewportSize) -> TimelineResult<()> {
        let plot_width = viewport.width_px() - self.config.margins.left - self.config.margins.right;
        let plot_height =
            viewport.height_px() - self.config.margins.top - self.config.margins.bottom;
        if plot_width <= 0.0 || plot_height <= 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "margins leave no plot area inside a {}x{} viewport",
                viewport.width(),
                viewport.height()
            )));
        }
        self.config.viewport = viewport;
        self.controller.resize(plot_width)?;
        self.notify(TimelineEvent::Resized {
            width: viewport.width(),
            height: viewport.height(),
        });
        Ok(())
    }

    /// Builds the frame for the current state and hands it to the
    /// renderer.
    pub fn render(&mut self) -> TimelineResult<()> {
        let ctx = SceneContext {
            registry: &self.registry,
            scale: self.controller.scale(),
            viewport: self.config.viewport,
            margins: self.config.margins,
            rulers: &self.config.rulers,
            formats: &self.config.formats,
            night: &self.config.night,
            lanes: &self.config.lanes,
            style: &self.style,
        };
        let (frame, stats) = build_render_frame(&ctx, &mut self.scene)?;
        self.last_join_stats = stats;
        debug!(
            primitives = frame.primitive_count(),
            entered = stats.entered,
            updated = stats.updated,
            exited = stats.exited,
            "render frame built"
        );
        self.renderer.render(&frame)?;
        self.notify(TimelineEvent::Rendered);
        Ok(())
    }

    /// Hit-tests sample dots near a viewport position. Dot positions
    /// come from the most recent render pass.
    pub fn tooltip_at(
        &self,
        x_px: f64,
        y_px: f64,
        radius_px: f64,
    ) -> TimelineResult<Option<TooltipModel>> {
        tooltip::tooltip_at(&self.registry, &self.scene, x_px, y_px, radius_px)
    }

    /// Registers an observer with a unique identifier.
    pub fn register_observer(&mut self, observer: Box<dyn TimelineObserver>) -> TimelineResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(TimelineError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.observers.iter().any(|entry| entry.id() == observer_id) {
            return Err(TimelineError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Unregisters an observer by id. Returns `true` when removed.
    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn has_observer(&self, observer_id: &str) -> bool {
        self.observers.iter().any(|entry| entry.id() == observer_id)
    }

    #[must_use]
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            viewport: self.config.viewport,
            visible_span: self.controller.visible_span(),
            reference_span: self.controller.reference_span(),
            animating: self.controller.is_animating(),
            feeds: self
                .registry
                .iter()
                .map(|feed| FeedSnapshot {
                    id: feed.id(),
                    label: feed.descriptor().label.clone(),
                    icon: feed.descriptor().icon.clone(),
                    shape: feed.descriptor().shape,
                    min_valid_value: feed.descriptor().min_valid_value,
                    sample_count: feed.samples().len(),
                })
                .collect(),
        }
    }

    pub fn snapshot_json_pretty(&self) -> TimelineResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }

    #[must_use]
    pub fn context(&self) -> TimelineContext {
        TimelineContext {
            visible_span: self.controller.visible_span(),
            reference_span: self.controller.reference_span(),
            viewport: self.config.viewport,
            feed_count: self.registry.len(),
            animating: self.controller.is_animating(),
        }
    }

    #[must_use]
    pub fn visible_span(&self) -> TimeSpan {
        self.controller.visible_span()
    }

    #[must_use]
    pub fn reference_span(&self) -> TimeSpan {
        self.controller.reference_span()
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportSize {
        self.config.viewport
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    #[must_use]
    pub fn feed(&self, id: FeedId) -> Option<&Feed> {
        self.registry.get(id)
    }

    pub fn feeds(&self) -> impl Iterator<Item = &Feed> {
        self.registry.iter()
    }

    #[must_use]
    pub fn feed_count(&self) -> usize {
        self.registry.len()
    }

    /// Rulers drawn at the current zoom, in slot order; hidden slots
    /// resolve to the yearly stand-in.
    #[must_use]
    pub fn visible_rulers(&self) -> SmallVec<[TickRuler; 4]> {
        self.config
            .rulers
            .select_rulers(self.visible_span().span_in_days())
    }

    /// Enter/update/exit counts from the most recent render pass.
    #[must_use]
    pub fn last_join_stats(&self) -> JoinStats {
        self.last_join_stats
    }

    /// Maps an instant to its viewport x position.
    #[must_use]
    pub fn time_to_pixel(&self, timestamp: f64) -> f64 {
        self.config.margins.left + self.controller.scale().time_to_pixel(timestamp)
    }

    /// Maps a viewport x position to the instant under it.
    #[must_use]
    pub fn pixel_to_time(&self, x_px: f64) -> f64 {
        self.controller
            .scale()
            .pixel_to_time(x_px - self.config.margins.left)
    }

    #[must_use]
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    #[must_use]
    pub fn style(&self) -> RenderStyle {
        self.style
    }

    pub fn set_style(&mut self, style: RenderStyle) -> TimelineResult<()> {
        self.style = style.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Reference span is the union of feed extents, falling back to the
    /// configured default span when no feed has one.
    fn recompute_reference(&mut self) {
        let reference = self
            .registry
            .full_span()
            .unwrap_or(self.config.default_span);
        self.controller.set_reference_span(reference);
    }

    fn start_reset(&mut self, target: TimeSpan) -> TimelineResult<()> {
        self.controller
            .begin_span_reset(target, self.config.tween_duration_seconds)?;
        if self.controller.is_animating() {
            self.notify(TimelineEvent::TweenStarted);
        } else {
            // Zero-duration resets land immediately.
            self.notify_span_changed(self.controller.visible_span());
        }
        Ok(())
    }

    fn notify_span_changed(&mut self, span: TimeSpan) {
        self.notify(TimelineEvent::SpanChanged {
            start: span.start(),
            end: span.end(),
        });
    }

    fn notify(&mut self, event: TimelineEvent) {
        let context = self.context();
        for observer in &mut self.observers {
            observer.on_event(event, context);
        }
    }
}
