use serde::{Deserialize, Serialize};

use crate::core::span::TimeSpan;
use crate::error::{TimelineError, TimelineResult};

/// Affine projection from a visible [`TimeSpan`] onto horizontal pixels.
///
/// Pixel `0.0` maps to `span.start()` and `width_px` maps to `span.end()`.
/// The projection is exact at both endpoints and linear in between, so
/// `pixel_to_time(time_to_pixel(t)) == t` up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePixelScale {
    span: TimeSpan,
    width_px: f64,
}

impl TimePixelScale {
    pub fn new(span: TimeSpan, width_px: f64) -> TimelineResult<Self> {
        if !width_px.is_finite() || width_px <= 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "scale width must be finite and positive, got {width_px}"
            )));
        }
        Ok(Self { span, width_px })
    }

    #[must_use]
    pub fn span(self) -> TimeSpan {
        self.span
    }

    #[must_use]
    pub fn width_px(self) -> f64 {
        self.width_px
    }

    /// Seconds of timeline covered by one horizontal pixel.
    #[must_use]
    pub fn seconds_per_pixel(self) -> f64 {
        self.span.duration_seconds() / self.width_px
    }

    #[must_use]
    pub fn time_to_pixel(self, time: f64) -> f64 {
        let fraction = (time - self.span.start()) / self.span.duration_seconds();
        fraction * self.width_px
    }

    #[must_use]
    pub fn pixel_to_time(self, pixel: f64) -> f64 {
        let fraction = pixel / self.width_px;
        self.span.start() + fraction * self.span.duration_seconds()
    }

    /// Width of `seconds` of timeline, in pixels.
    #[must_use]
    pub fn seconds_to_pixel_width(self, seconds: f64) -> f64 {
        seconds / self.seconds_per_pixel()
    }
}
