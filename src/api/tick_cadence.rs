//! Calendar-aware tick cadence for the main ruler.
//!
//! Tick spacing follows a fixed ladder of calendar steps (seconds up
//! through multi-year) rather than raw numeric intervals, so labels land
//! on instants a reader recognizes: quarter hours, midnights, Sundays,
//! month starts. The step is chosen so adjacent ticks sit roughly
//! [`TICK_TARGET_SPACING_PX`] apart at the current zoom.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use tracing::warn;

use crate::core::span::TimeSpan;
use crate::core::time::{
    datetime_to_unix_seconds, floor_to_day, floor_to_hour, floor_to_minute, floor_to_month,
    floor_to_second, floor_to_week, floor_to_year, unix_seconds_to_datetime,
};
use crate::error::TimelineResult;

/// Preferred pixel distance between adjacent main-ruler ticks.
pub const TICK_TARGET_SPACING_PX: f64 = 72.0;

/// Upper bound on ticks produced by a single walk.
const MAX_TICKS: usize = 10_000;

const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Calendar unit of one tick step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// One rung of the cadence ladder: `count` multiples of `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStep {
    pub unit: TickUnit,
    pub count: u32,
}

const STEP_LADDER: [(TickUnit, u32, f64); 18] = [
    (TickUnit::Second, 1, 1.0),
    (TickUnit::Second, 5, 5.0),
    (TickUnit::Second, 15, 15.0),
    (TickUnit::Second, 30, 30.0),
    (TickUnit::Minute, 1, 60.0),
    (TickUnit::Minute, 5, 300.0),
    (TickUnit::Minute, 15, 900.0),
    (TickUnit::Minute, 30, 1_800.0),
    (TickUnit::Hour, 1, 3_600.0),
    (TickUnit::Hour, 3, 10_800.0),
    (TickUnit::Hour, 6, 21_600.0),
    (TickUnit::Hour, 12, 43_200.0),
    (TickUnit::Day, 1, 86_400.0),
    (TickUnit::Day, 2, 172_800.0),
    (TickUnit::Week, 1, 604_800.0),
    (TickUnit::Month, 1, 2_592_000.0),
    (TickUnit::Month, 3, 7_776_000.0),
    (TickUnit::Year, 1, SECONDS_PER_YEAR),
];

/// Chooses the ladder step whose length best matches one tick per
/// `target_spacing_px` of `width_px`. Spans longer than the ladder covers
/// fall through to a rounded multi-year step.
///
/// Non-finite or non-positive inputs fall back to the densest usable
/// interpretation instead of failing.
#[must_use]
pub fn select_tick_step(duration_seconds: f64, width_px: f64, target_spacing_px: f64) -> TickStep {
    let target_count = if width_px.is_finite()
        && width_px > 0.0
        && target_spacing_px.is_finite()
        && target_spacing_px > 0.0
    {
        (width_px / target_spacing_px).max(1.0)
    } else {
        1.0
    };
    let ideal_seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
        duration_seconds / target_count
    } else {
        1.0
    };

    for (index, &(unit, count, seconds)) in STEP_LADDER.iter().enumerate() {
        if seconds >= ideal_seconds {
            if index > 0 {
                let (previous_unit, previous_count, previous_seconds) = STEP_LADDER[index - 1];
                if ideal_seconds / previous_seconds < seconds / ideal_seconds {
                    return TickStep {
                        unit: previous_unit,
                        count: previous_count,
                    };
                }
            }
            return TickStep { unit, count };
        }
    }

    TickStep {
        unit: TickUnit::Year,
        count: nice_year_step(ideal_seconds / SECONDS_PER_YEAR),
    }
}

/// Walks the calendar boundaries of `step` that fall inside `span`,
/// endpoints included, and returns them as logical timestamps.
pub fn tick_instants(span: TimeSpan, step: TickStep) -> TimelineResult<Vec<f64>> {
    let start = unix_seconds_to_datetime(span.start())?;
    let end = unix_seconds_to_datetime(span.end())?;

    let mut ticks = Vec::new();
    let mut cursor = first_on_or_after(start, step);
    while cursor <= end {
        ticks.push(datetime_to_unix_seconds(cursor));
        if ticks.len() >= MAX_TICKS {
            warn!(
                limit = MAX_TICKS,
                unit = ?step.unit,
                count = step.count,
                "tick walk reached the safety limit; truncating"
            );
            break;
        }
        let next = advance(cursor, step);
        if next <= cursor {
            warn!(
                unit = ?step.unit,
                count = step.count,
                "tick walk stalled at the calendar range edge; truncating"
            );
            break;
        }
        cursor = next;
    }
    Ok(ticks)
}

/// Adaptive main-ruler ticks for a span `width_px` pixels wide.
pub fn time_ticks(
    span: TimeSpan,
    width_px: f64,
    target_spacing_px: f64,
) -> TimelineResult<Vec<f64>> {
    let step = select_tick_step(span.duration_seconds(), width_px, target_spacing_px);
    tick_instants(span, step)
}

/// UTC midnight boundaries inside `span`, for the day gridline ruler.
pub fn day_boundaries(span: TimeSpan) -> TimelineResult<Vec<f64>> {
    tick_instants(
        span,
        TickStep {
            unit: TickUnit::Day,
            count: 1,
        },
    )
}

/// Sunday week starts inside `span`, for the week gridline ruler.
pub fn week_boundaries(span: TimeSpan) -> TimelineResult<Vec<f64>> {
    tick_instants(
        span,
        TickStep {
            unit: TickUnit::Week,
            count: 1,
        },
    )
}

/// January 1 boundaries inside `span`, for rulers hidden at this zoom.
pub fn year_boundaries(span: TimeSpan) -> TimelineResult<Vec<f64>> {
    tick_instants(
        span,
        TickStep {
            unit: TickUnit::Year,
            count: 1,
        },
    )
}

/// First boundary of `step` at or after `start`.
///
/// Sub-day steps align to their calendar position (second 0/15/30/45 for
/// a 15-second step), days to odd days of month, months to quarter
/// starts, years to multiples of the step count.
fn first_on_or_after(start: DateTime<Utc>, step: TickStep) -> DateTime<Utc> {
    let count = step.count.max(1);
    match step.unit {
        TickUnit::Second => {
            let mut cursor = floor_to_second(start);
            if cursor < start {
                cursor += Duration::seconds(1);
            }
            while cursor.second() % count != 0 {
                cursor += Duration::seconds(1);
            }
            cursor
        }
        TickUnit::Minute => {
            let mut cursor = floor_to_minute(start);
            if cursor < start {
                cursor += Duration::minutes(1);
            }
            while cursor.minute() % count != 0 {
                cursor += Duration::minutes(1);
            }
            cursor
        }
        TickUnit::Hour => {
            let mut cursor = floor_to_hour(start);
            if cursor < start {
                cursor += Duration::hours(1);
            }
            while cursor.hour() % count != 0 {
                cursor += Duration::hours(1);
            }
            cursor
        }
        TickUnit::Day => {
            let mut cursor = floor_to_day(start);
            if cursor < start {
                cursor += Duration::days(1);
            }
            while cursor.day0() % count != 0 {
                cursor += Duration::days(1);
            }
            cursor
        }
        TickUnit::Week => {
            let mut cursor = floor_to_week(start);
            if cursor < start {
                cursor += Duration::days(7);
            }
            cursor
        }
        TickUnit::Month => {
            let mut cursor = floor_to_month(start);
            if cursor < start {
                cursor = add_months(cursor, 1);
            }
            while cursor.month0() % count != 0 {
                cursor = add_months(cursor, 1);
            }
            cursor
        }
        TickUnit::Year => {
            let mut cursor = floor_to_year(start);
            if cursor < start {
                cursor = january_first(cursor.year() + 1, cursor);
            }
            while cursor.year().rem_euclid(count as i32) != 0 {
                cursor = january_first(cursor.year() + 1, cursor);
            }
            cursor
        }
    }
}

/// Next boundary after `cursor`, preserving the alignment established by
/// [`first_on_or_after`].
fn advance(cursor: DateTime<Utc>, step: TickStep) -> DateTime<Utc> {
    let count = step.count.max(1);
    match step.unit {
        TickUnit::Second => {
            let mut next = cursor + Duration::seconds(i64::from(count));
            while next.second() % count != 0 {
                next += Duration::seconds(1);
            }
            next
        }
        TickUnit::Minute => {
            let mut next = cursor + Duration::minutes(i64::from(count));
            while next.minute() % count != 0 {
                next += Duration::minutes(1);
            }
            next
        }
        TickUnit::Hour => {
            let mut next = cursor + Duration::hours(i64::from(count));
            while next.hour() % count != 0 {
                next += Duration::hours(1);
            }
            next
        }
        TickUnit::Day => {
            let mut next = cursor + Duration::days(i64::from(count));
            while next.day0() % count != 0 {
                next += Duration::days(1);
            }
            next
        }
        TickUnit::Week => cursor + Duration::days(7),
        TickUnit::Month => {
            let mut next = add_months(cursor, count);
            while next.month0() % count != 0 {
                next = add_months(next, 1);
            }
            next
        }
        TickUnit::Year => january_first(cursor.year() + count as i32, cursor),
    }
}

/// `months` month starts after `datetime`; only ever called on month
/// starts, where the arithmetic cannot produce an invalid date.
fn add_months(datetime: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let zero_based = datetime.month0() + months;
    let year = datetime.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(datetime)
}

fn january_first(year: i32, fallback: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(fallback)
}

/// Rounds a fractional year count up onto a 1/2/5 ladder.
fn nice_year_step(raw_years: f64) -> u32 {
    if !raw_years.is_finite() || raw_years <= 1.0 {
        return 1;
    }
    let magnitude = 10_f64.powf(raw_years.log10().floor());
    let error = magnitude / raw_years;
    let factor = if error <= 0.15 {
        10.0
    } else if error <= 0.35 {
        5.0
    } else if error <= 0.75 {
        2.0
    } else {
        1.0
    };
    let step = factor * magnitude;
    if step >= u32::MAX as f64 {
        u32::MAX
    } else {
        step.round() as u32
    }
}
