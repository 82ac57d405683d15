//! Projection of feed samples into lane-local pixel geometry.
//!
//! These functions are pure so rendering and tests consume identical
//! output. Shapes are projected against the shared horizontal scale and a
//! per-lane value scale; validity (gap samples, values under the feed's
//! floor) is resolved here so downstream layers only deal in geometry.

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::feed::Feed;
use crate::core::lane::ValueScale;
use crate::core::scale::TimePixelScale;
use crate::core::time::{datetime_to_unix_seconds, floor_to_day, unix_seconds_to_datetime};
use crate::core::types::Sample;
use crate::error::TimelineResult;

/// Projected marker for one sample of a points feed.
///
/// `valid` is false for gap samples and suppressed values; those markers
/// are drawn smaller and fainter rather than dropped, so gaps stay
/// discoverable on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDot {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub valid: bool,
}

/// Projected bar covering one calendar day of a bars feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayBar {
    pub day_start: f64,
    pub x_left: f64,
    pub x_right: f64,
    pub y_top: f64,
    pub y_bottom: f64,
}

/// Projected straight segment between two valid samples of a line feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub from_timestamp: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Projects a points feed into dot markers.
///
/// Feeds without any measured value (pure event feeds) center their dots
/// in the lane; measurement feeds place dots at the value position, with
/// invalid samples pinned to the lane floor.
pub fn project_point_dots(
    feed: &Feed,
    time_scale: TimePixelScale,
    value_scale: ValueScale,
) -> Vec<PointDot> {
    let event_feed = !feed.has_values();
    let mid_y = value_scale.band().y_mid();
    let floor_y = value_scale.band().y_bottom();

    let project_one = |sample: &Sample| -> PointDot {
        let x = time_scale.time_to_pixel(sample.timestamp);
        if event_feed {
            return PointDot {
                timestamp: sample.timestamp,
                x,
                y: mid_y,
                valid: true,
            };
        }
        match feed.effective_value(*sample) {
            Some(value) => PointDot {
                timestamp: sample.timestamp,
                x,
                y: value_scale.value_to_pixel(value),
                valid: true,
            },
            None => PointDot {
                timestamp: sample.timestamp,
                x,
                y: floor_y,
                valid: false,
            },
        }
    };

    #[cfg(feature = "parallel-projection")]
    {
        feed.samples().par_iter().map(project_one).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        feed.samples().iter().map(project_one).collect()
    }
}

/// Projects a bars feed into one bar per calendar day.
///
/// The bar spans its day on the horizontal scale minus `gap_px` on the
/// right edge, so adjacent days stay visually separate. Multiple samples
/// on one day collapse to the latest; invalid samples produce no bar.
pub fn project_day_bars(
    feed: &Feed,
    time_scale: TimePixelScale,
    value_scale: ValueScale,
    gap_px: f64,
) -> TimelineResult<Vec<DayBar>> {
    let mut per_day: Vec<(f64, f64)> = Vec::new();
    for &sample in feed.samples() {
        let Some(value) = feed.effective_value(sample) else {
            continue;
        };
        let day = floor_to_day(unix_seconds_to_datetime(sample.timestamp)?);
        let day_start = datetime_to_unix_seconds(day);
        match per_day.last_mut() {
            Some((last_day, last_value)) if *last_day == day_start => *last_value = value,
            _ => per_day.push((day_start, value)),
        }
    }

    let day_width = time_scale.seconds_to_pixel_width(crate::core::span::SECONDS_PER_DAY);
    let floor_y = value_scale.band().y_bottom();
    let mut bars = Vec::with_capacity(per_day.len());
    for (day_start, value) in per_day {
        let x_left = time_scale.time_to_pixel(day_start);
        let x_right = (x_left + day_width - gap_px).max(x_left);
        let y_value = value_scale.value_to_pixel(value);
        bars.push(DayBar {
            day_start,
            x_left,
            x_right,
            y_top: y_value.min(floor_y),
            y_bottom: floor_y,
        });
    }
    Ok(bars)
}

/// Projects a line feed into segments connecting successive valid samples.
///
/// Invalid samples are skipped; the trend continues between their valid
/// neighbors.
pub fn project_trend_segments(
    feed: &Feed,
    time_scale: TimePixelScale,
    value_scale: ValueScale,
) -> Vec<TrendSegment> {
    let valid: Vec<(f64, f64)> = feed
        .samples()
        .iter()
        .filter_map(|&sample| {
            feed.effective_value(sample)
                .map(|value| (sample.timestamp, value))
        })
        .collect();

    if valid.len() < 2 {
        return Vec::new();
    }

    let positions: Vec<(f64, f64, f64)>;
    #[cfg(feature = "parallel-projection")]
    {
        positions = valid
            .par_iter()
            .map(|&(timestamp, value)| {
                (
                    timestamp,
                    time_scale.time_to_pixel(timestamp),
                    value_scale.value_to_pixel(value),
                )
            })
            .collect();
    }
    #[cfg(not(feature = "parallel-projection"))]
    {
        positions = valid
            .iter()
            .map(|&(timestamp, value)| {
                (
                    timestamp,
                    time_scale.time_to_pixel(timestamp),
                    value_scale.value_to_pixel(value),
                )
            })
            .collect();
    }

    let mut segments = Vec::with_capacity(positions.len() - 1);
    for pair in positions.windows(2) {
        segments.push(TrendSegment {
            from_timestamp: pair[0].0,
            x1: pair[0].1,
            y1: pair[0].2,
            x2: pair[1].1,
            y2: pair[1].2,
        });
    }
    segments
}
