//! Dusk-to-dawn interval generation for background shading.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::span::TimeSpan;
use crate::core::time::{at_hour, floor_to_day, unix_seconds_to_datetime};
use crate::error::{TimelineError, TimelineResult};

/// Controls for night-interval shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightShadeConfig {
    /// Hour of day (0..=23) when shading starts.
    pub dusk_hour: u32,
    /// Hour of day (0..=23) on the following day when shading ends.
    pub dawn_hour: u32,
    /// Shading is suppressed when the visible span exceeds this many days.
    pub max_visible_span_days: f64,
}

impl Default for NightShadeConfig {
    fn default() -> Self {
        Self {
            dusk_hour: 18,
            dawn_hour: 6,
            max_visible_span_days: 14.0,
        }
    }
}

impl NightShadeConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        if self.dusk_hour > 23 || self.dawn_hour > 23 {
            return Err(TimelineError::InvalidData(
                "night shade hours must be within 0..=23".to_owned(),
            ));
        }
        if !self.max_visible_span_days.is_finite() || self.max_visible_span_days <= 0.0 {
            return Err(TimelineError::InvalidData(
                "night shade visibility threshold must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Whether shading is drawn at the given zoom level.
    #[must_use]
    pub fn visible_at(&self, span_in_days: f64) -> bool {
        span_in_days <= self.max_visible_span_days
    }
}

/// One dusk-to-dawn interval per calendar day touched by `span`.
///
/// The walk starts at `span.start()` and advances in whole days while the
/// cursor has not passed `span.end()`; each visited instant contributes the
/// interval `[date 18:00, date+1 06:00]` (with the configured hours). A
/// single-instant span therefore yields exactly one interval, and intervals
/// cross month boundaries through calendar arithmetic rather than fixed
/// offsets.
pub fn night_intervals(span: TimeSpan, config: &NightShadeConfig) -> TimelineResult<Vec<TimeSpan>> {
    let end = unix_seconds_to_datetime(span.end())?;
    let mut cursor = unix_seconds_to_datetime(span.start())?;
    let mut intervals = Vec::new();

    while cursor <= end {
        let day = floor_to_day(cursor);
        let dusk = at_hour(day, config.dusk_hour);
        let dawn = at_hour(day + Duration::days(1), config.dawn_hour);
        intervals.push(TimeSpan::from_datetimes(dusk, dawn)?);
        cursor += Duration::days(1);
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::core::span::TimeSpan;
    use crate::core::time::datetime_to_unix_seconds;

    use super::{NightShadeConfig, night_intervals};

    #[test]
    fn single_instant_span_yields_one_interval() {
        let jan2 = Utc.with_ymd_and_hms(2016, 1, 2, 0, 0, 0).unwrap();
        let t = datetime_to_unix_seconds(jan2);
        let span = TimeSpan::new(t, t).expect("valid span");

        let intervals =
            night_intervals(span, &NightShadeConfig::default()).expect("intervals generated");
        assert_eq!(intervals.len(), 1);

        let dusk = Utc.with_ymd_and_hms(2016, 1, 2, 18, 0, 0).unwrap();
        let dawn = Utc.with_ymd_and_hms(2016, 1, 3, 6, 0, 0).unwrap();
        assert_eq!(intervals[0].start(), datetime_to_unix_seconds(dusk));
        assert_eq!(intervals[0].end(), datetime_to_unix_seconds(dawn));
    }
}
