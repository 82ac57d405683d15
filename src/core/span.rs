use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::time::datetime_to_unix_seconds;
use crate::error::{TimelineError, TimelineResult};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Minimum usable span width in seconds.
///
/// Degenerate inputs (start == end) are widened to this so span-derived
/// quantities (days-in-view, magnification) never divide by zero.
pub const MIN_SPAN_SECONDS: f64 = 1.0;

/// Visible time window in Unix seconds.
///
/// The invariant `start <= end` is maintained by every constructor; callers
/// can rely on `duration_seconds() > 0` for any value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

impl TimeSpan {
    /// Builds a normalized span from two instants in Unix seconds.
    ///
    /// Endpoints may arrive in either order; a degenerate pair is widened
    /// forward from its start by [`MIN_SPAN_SECONDS`]. Widening forward
    /// keeps the start instant's calendar date intact, which day-based
    /// consumers (night shading, day rulers) rely on.
    pub fn new(start: f64, end: f64) -> TimelineResult<Self> {
        let (start, end) = normalize_endpoints(start, end, MIN_SPAN_SECONDS)?;
        Ok(Self { start, end })
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> TimelineResult<Self> {
        Self::new(
            datetime_to_unix_seconds(start),
            datetime_to_unix_seconds(end),
        )
    }

    /// Fits a span to the extent of raw timestamps.
    pub fn from_timestamps(timestamps: &[f64]) -> TimelineResult<Self> {
        if timestamps.is_empty() {
            return Err(TimelineError::InvalidData(
                "time span cannot be built from empty timestamps".to_owned(),
            ));
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &timestamp in timestamps {
            if !timestamp.is_finite() {
                return Err(TimelineError::InvalidData(
                    "timestamps must be finite".to_owned(),
                ));
            }
            min = min.min(timestamp);
            max = max.max(timestamp);
        }

        Self::new(min, max)
    }

    #[must_use]
    pub fn start(self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn duration_seconds(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn span_in_days(self) -> f64 {
        self.duration_seconds() / SECONDS_PER_DAY
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        self.start + self.duration_seconds() * 0.5
    }

    #[must_use]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Smallest span covering both operands.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Linear interpolation toward `target`, endpoint by endpoint.
    ///
    /// `t` is clamped to `[0, 1]`; `t == 0` returns `self`, `t == 1` returns
    /// `target` exactly.
    #[must_use]
    pub fn lerp(self, target: Self, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        if t >= 1.0 {
            return target;
        }
        Self {
            start: self.start + (target.start - self.start) * t,
            end: self.end + (target.end - self.end) * t,
        }
    }

    pub fn translate(self, delta_seconds: f64) -> TimelineResult<Self> {
        if !delta_seconds.is_finite() {
            return Err(TimelineError::InvalidData(
                "span translation delta must be finite".to_owned(),
            ));
        }
        Ok(Self {
            start: self.start + delta_seconds,
            end: self.end + delta_seconds,
        })
    }
}

fn normalize_endpoints(start: f64, end: f64, min_span: f64) -> TimelineResult<(f64, f64)> {
    if !start.is_finite() || !end.is_finite() {
        return Err(TimelineError::InvalidData(
            "span endpoints must be finite".to_owned(),
        ));
    }

    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    if high - low < min_span {
        return Ok((low, low + min_span));
    }

    Ok((low, high))
}

#[cfg(test)]
mod tests {
    use super::TimeSpan;

    #[test]
    fn degenerate_span_is_widened_and_days_stay_finite() {
        let span = TimeSpan::new(1_451_606_400.0, 1_451_606_400.0).expect("valid span");
        assert!(span.duration_seconds() > 0.0);
        assert!(span.span_in_days().is_finite());
    }

    #[test]
    fn reversed_endpoints_are_reordered() {
        let span = TimeSpan::new(200.0, 100.0).expect("valid span");
        assert_eq!(span.start(), 100.0);
        assert_eq!(span.end(), 200.0);
    }
}
