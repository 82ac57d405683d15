//! Vertical lane layout and per-lane value scaling.
//!
//! Each feed occupies one horizontal band of the plot area. With `N` feeds,
//! lane padding `P`, and plot height `H`, every lane is
//! `(H - P) / N - P` pixels tall and lane `i` starts at
//! `P * (i + 1) + lane_height * i`. Values map linearly onto the lane with
//! the floor at the bottom edge.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TimelineError, TimelineResult};

/// Layout controls for stacked feed lanes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneLayoutConfig {
    pub lane_padding_px: f64,
}

impl Default for LaneLayoutConfig {
    fn default() -> Self {
        Self {
            lane_padding_px: 20.0,
        }
    }
}

impl LaneLayoutConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        if !self.lane_padding_px.is_finite() || self.lane_padding_px < 0.0 {
            return Err(TimelineError::InvalidData(
                "lane padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// One feed's band within the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneBand {
    pub index: usize,
    pub y_top: f64,
    pub height: f64,
}

impl LaneBand {
    #[must_use]
    pub fn y_bottom(self) -> f64 {
        self.y_top + self.height
    }

    #[must_use]
    pub fn y_mid(self) -> f64 {
        self.y_top + self.height * 0.5
    }
}

/// Splits the plot height into one band per lane.
///
/// A plot too short for the requested lane count degrades to one-pixel
/// lanes instead of failing the whole render.
pub fn layout_lanes(
    plot_height_px: f64,
    lane_count: usize,
    config: &LaneLayoutConfig,
) -> TimelineResult<Vec<LaneBand>> {
    if !plot_height_px.is_finite() || plot_height_px <= 0.0 {
        return Err(TimelineError::InvalidData(format!(
            "plot height must be finite and > 0, got {plot_height_px}"
        )));
    }
    if lane_count == 0 {
        return Ok(Vec::new());
    }

    let padding = config.lane_padding_px;
    let mut lane_height = (plot_height_px - padding) / lane_count as f64 - padding;
    if lane_height < 1.0 {
        warn!(
            plot_height_px,
            lane_count, "plot too short for lane count, clamping lane height"
        );
        lane_height = 1.0;
    }

    let mut bands = Vec::with_capacity(lane_count);
    for index in 0..lane_count {
        let y_top = padding * (index as f64 + 1.0) + lane_height * index as f64;
        bands.push(LaneBand {
            index,
            y_top,
            height: lane_height,
        });
    }
    Ok(bands)
}

/// Linear mapping from measurement values onto a lane's vertical extent.
///
/// The floor maps to the lane bottom and the ceiling to the lane top; a
/// degenerate domain is widened upward so projection never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    floor: f64,
    ceiling: f64,
    band: LaneBand,
}

impl ValueScale {
    pub fn new(floor: f64, ceiling: f64, band: LaneBand) -> TimelineResult<Self> {
        if !floor.is_finite() || !ceiling.is_finite() {
            return Err(TimelineError::InvalidData(
                "value scale domain must be finite".to_owned(),
            ));
        }
        let ceiling = if ceiling > floor { ceiling } else { floor + 1.0 };
        Ok(Self {
            floor,
            ceiling,
            band,
        })
    }

    #[must_use]
    pub fn floor(self) -> f64 {
        self.floor
    }

    #[must_use]
    pub fn ceiling(self) -> f64 {
        self.ceiling
    }

    #[must_use]
    pub fn band(self) -> LaneBand {
        self.band
    }

    #[must_use]
    pub fn value_to_pixel(self, value: f64) -> f64 {
        let fraction = (value - self.floor) / (self.ceiling - self.floor);
        self.band.y_top + (1.0 - fraction) * self.band.height
    }
}

/// Round tick positions covering `[floor, ceiling]`, aiming for
/// `target_count` ticks on a 1/2/5 step ladder.
#[must_use]
pub fn nice_value_ticks(floor: f64, ceiling: f64, target_count: usize) -> Vec<f64> {
    if target_count == 0 || !floor.is_finite() || !ceiling.is_finite() || ceiling <= floor {
        return Vec::new();
    }

    let step = nice_step((ceiling - floor) / target_count as f64);
    if step <= 0.0 {
        return Vec::new();
    }

    let first = (floor / step).ceil();
    let last = (ceiling / step).floor();
    let mut ticks = Vec::new();
    let mut index = first;
    while index <= last {
        ticks.push(index * step);
        index += 1.0;
    }
    ticks
}

fn nice_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 0.0;
    }
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let factor = if residual >= 50f64.sqrt() {
        10.0
    } else if residual >= 10f64.sqrt() {
        5.0
    } else if residual >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    magnitude * factor
}
