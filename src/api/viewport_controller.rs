//! Visible-span ownership: pan, zoom, and animated span resets.
//!
//! The controller holds the one mutable copy of the visible span and its
//! pixel mapping. Gestures edit it immediately; programmatic navigation
//! goes through a driver-stepped tween so hosts control frame pacing.
//! Magnification limits are measured against the reference span, which
//! tracks the union of feed extents rather than rebasing on navigation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::scale::TimePixelScale;
use crate::core::span::TimeSpan;
use crate::error::{TimelineError, TimelineResult};

/// Magnification limits and edge behavior for pan/zoom gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPolicy {
    /// Smallest allowed magnification relative to the reference span.
    pub min_magnification: f64,
    /// Largest allowed magnification relative to the reference span.
    pub max_magnification: f64,
    /// Slide the span back inside the reference edges after gestures.
    pub clamp_to_reference: bool,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min_magnification: 1.0,
            max_magnification: 1_000.0,
            clamp_to_reference: true,
        }
    }
}

impl ZoomPolicy {
    pub fn validate(self) -> TimelineResult<Self> {
        if !self.min_magnification.is_finite()
            || !self.max_magnification.is_finite()
            || self.min_magnification <= 0.0
        {
            return Err(TimelineError::InvalidData(format!(
                "magnification limits must be finite and positive, got [{}, {}]",
                self.min_magnification, self.max_magnification
            )));
        }
        if self.max_magnification < self.min_magnification {
            return Err(TimelineError::InvalidData(format!(
                "max magnification {} is below min magnification {}",
                self.max_magnification, self.min_magnification
            )));
        }
        Ok(self)
    }
}

/// One step of an in-flight span reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenProgress {
    pub span: TimeSpan,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpanTween {
    origin: TimeSpan,
    target: TimeSpan,
    duration_seconds: f64,
    elapsed_seconds: f64,
}

/// Owns the visible span and its time-to-pixel mapping.
#[derive(Debug, Clone)]
pub struct ViewportController {
    scale: TimePixelScale,
    reference: TimeSpan,
    policy: ZoomPolicy,
    tween: Option<SpanTween>,
}

impl ViewportController {
    /// Builds a controller showing `visible` across `width_px` pixels.
    /// The reference span starts equal to the visible span.
    pub fn new(visible: TimeSpan, width_px: f64, policy: ZoomPolicy) -> TimelineResult<Self> {
        let policy = policy.validate()?;
        let scale = TimePixelScale::new(visible, width_px)?;
        Ok(Self {
            scale,
            reference: visible,
            policy,
            tween: None,
        })
    }

    #[must_use]
    pub fn visible_span(&self) -> TimeSpan {
        self.scale.span()
    }

    #[must_use]
    pub fn reference_span(&self) -> TimeSpan {
        self.reference
    }

    #[must_use]
    pub fn width_px(&self) -> f64 {
        self.scale.width_px()
    }

    #[must_use]
    pub fn scale(&self) -> TimePixelScale {
        self.scale
    }

    #[must_use]
    pub fn policy(&self) -> ZoomPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn set_reference_span(&mut self, span: TimeSpan) {
        self.reference = span;
    }

    /// Grows the reference span to cover `span`.
    pub fn widen_reference(&mut self, span: TimeSpan) {
        self.reference = self.reference.union(span);
    }

    /// Shifts the visible span by the time equivalent of `delta_px`.
    ///
    /// Positive deltas move the window toward later times. Cancels any
    /// in-flight tween.
    pub fn pan_by_pixels(&mut self, delta_px: f64) -> TimelineResult<TimeSpan> {
        if !delta_px.is_finite() {
            return Err(TimelineError::InvalidData(format!(
                "pan delta must be finite, got {delta_px}"
            )));
        }
        self.tween = None;

        let delta_seconds = delta_px * self.scale.seconds_per_pixel();
        let mut panned = self.scale.span().translate(delta_seconds)?;
        if self.policy.clamp_to_reference {
            panned = translate_into(panned, self.reference)?;
        }
        self.set_visible(panned)?;
        debug!(
            delta_px,
            start = panned.start(),
            end = panned.end(),
            "viewport panned"
        );
        Ok(panned)
    }

    /// Rescales the visible span by `factor` about the instant under
    /// `anchor_px`; factors above one zoom in.
    ///
    /// The anchor instant keeps its pixel position unless a magnification
    /// or translate clamp intervenes. Cancels any in-flight tween.
    pub fn zoom_around_pixel(&mut self, factor: f64, anchor_px: f64) -> TimelineResult<TimeSpan> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "zoom factor must be finite and positive, got {factor}"
            )));
        }
        if !anchor_px.is_finite() {
            return Err(TimelineError::InvalidData(format!(
                "zoom anchor must be finite, got {anchor_px}"
            )));
        }
        self.tween = None;

        let visible = self.scale.span();
        let anchor_time = self.scale.pixel_to_time(anchor_px);
        let fraction = anchor_px / self.scale.width_px();
        let duration = self.clamp_magnification(visible.duration_seconds() / factor);

        let start = anchor_time - fraction * duration;
        let mut zoomed = TimeSpan::new(start, start + duration)?;
        if self.policy.clamp_to_reference {
            zoomed = translate_into(zoomed, self.reference)?;
        }
        self.set_visible(zoomed)?;
        debug!(
            factor,
            anchor_px,
            start = zoomed.start(),
            end = zoomed.end(),
            "viewport zoomed"
        );
        Ok(zoomed)
    }

    /// Starts an animated transition of the visible span toward `target`.
    ///
    /// A reset issued while another runs retargets from the current
    /// interpolated span, so the newest target always wins. A zero
    /// duration applies the target immediately.
    pub fn begin_span_reset(
        &mut self,
        target: TimeSpan,
        duration_seconds: f64,
    ) -> TimelineResult<()> {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "tween duration must be finite and non-negative, got {duration_seconds}"
            )));
        }
        if duration_seconds == 0.0 {
            self.tween = None;
            return self.set_visible(target);
        }
        self.tween = Some(SpanTween {
            origin: self.scale.span(),
            target,
            duration_seconds,
            elapsed_seconds: 0.0,
        });
        Ok(())
    }

    /// Drops an in-flight tween, keeping the current interpolated span.
    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }

    /// Advances the in-flight span tween by `delta_seconds`.
    ///
    /// Returns `None` when no tween is running. Interpolation is linear
    /// and the final step lands exactly on the target span.
    pub fn step_animation(&mut self, delta_seconds: f64) -> TimelineResult<Option<TweenProgress>> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "animation step must be finite and non-negative, got {delta_seconds}"
            )));
        }
        let Some(tween) = self.tween.as_mut() else {
            return Ok(None);
        };

        tween.elapsed_seconds += delta_seconds;
        let progress = (tween.elapsed_seconds / tween.duration_seconds).min(1.0);
        let span = tween.origin.lerp(tween.target, progress);
        let completed = progress >= 1.0;
        if completed {
            self.tween = None;
        }
        self.set_visible(span)?;
        Ok(Some(TweenProgress { span, completed }))
    }

    /// Adopts a new pixel width, preserving the visible span.
    pub fn resize(&mut self, width_px: f64) -> TimelineResult<()> {
        self.scale = TimePixelScale::new(self.scale.span(), width_px)?;
        Ok(())
    }

    fn set_visible(&mut self, span: TimeSpan) -> TimelineResult<()> {
        self.scale = TimePixelScale::new(span, self.scale.width_px())?;
        Ok(())
    }

    /// Clamps a candidate span length to the magnification limits
    /// measured against the reference span.
    fn clamp_magnification(&self, duration_seconds: f64) -> f64 {
        let reference = self.reference.duration_seconds();
        let shortest = reference / self.policy.max_magnification;
        let longest = reference / self.policy.min_magnification;
        duration_seconds.clamp(shortest, longest)
    }
}

/// Slides `span` back inside `reference` without resizing it. A span
/// longer than the reference keeps its end pinned to the reference end.
fn translate_into(span: TimeSpan, reference: TimeSpan) -> TimelineResult<TimeSpan> {
    let mut delta = 0.0;
    if span.start() < reference.start() {
        delta = reference.start() - span.start();
    }
    if span.end() + delta > reference.end() {
        delta = reference.end() - span.end();
    }
    if delta == 0.0 {
        Ok(span)
    } else {
        span.translate(delta)
    }
}
