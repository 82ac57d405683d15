use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::core::time::datetime_to_unix_seconds;
use crate::error::{TimelineError, TimelineResult};

/// One observation in a feed: an instant plus an optional measured value.
///
/// `value: None` marks an explicit gap. Gap samples still occupy a slot on
/// the time axis (tooltips report them as missing) but are skipped by every
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: f64,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> TimelineResult<Self> {
        if !timestamp.is_finite() {
            return Err(TimelineError::InvalidData(
                "sample timestamp must be finite".to_owned(),
            ));
        }
        if !value.is_finite() {
            return Err(TimelineError::InvalidData(format!(
                "sample value must be finite, got {value}"
            )));
        }
        Ok(Self {
            timestamp,
            value: Some(value),
        })
    }

    /// A sample that marks a known gap in the feed.
    pub fn missing(timestamp: f64) -> TimelineResult<Self> {
        if !timestamp.is_finite() {
            return Err(TimelineError::InvalidData(
                "sample timestamp must be finite".to_owned(),
            ));
        }
        Ok(Self {
            timestamp,
            value: None,
        })
    }

    /// Builds a sample from a decimal source value, e.g. parsed sensor data.
    pub fn from_decimal(timestamp: f64, value: Decimal) -> TimelineResult<Self> {
        let value = value.to_f64().ok_or_else(|| {
            TimelineError::InvalidData(format!("decimal value {value} is not representable as f64"))
        })?;
        Self::new(timestamp, value)
    }

    /// Builds a sample from calendar time and a decimal source value.
    pub fn from_datetime_decimal(at: DateTime<Utc>, value: Decimal) -> TimelineResult<Self> {
        Self::from_decimal(datetime_to_unix_seconds(at), value)
    }

    #[must_use]
    pub fn is_missing(self) -> bool {
        self.value.is_none()
    }
}

/// How a feed's samples are drawn in its lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedShape {
    /// One marker per valid sample.
    Points,
    /// One bar per calendar day, sized to the day minus a half-pixel gap.
    Bars,
    /// A polyline through consecutive valid samples.
    Line,
}

impl FeedShape {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Bars => "bars",
            Self::Line => "line",
        }
    }
}

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    width: u32,
    height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> TimelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(TimelineError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn width_px(self) -> f64 {
        f64::from(self.width)
    }

    #[must_use]
    pub fn height_px(self) -> f64 {
        f64::from(self.height)
    }
}
