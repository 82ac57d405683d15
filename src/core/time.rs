//! Conversions between the engine's logical clock and calendar time.
//!
//! The engine works in `f64` Unix seconds everywhere; `chrono` enters only
//! at the edges where calendar arithmetic (day boundaries, weekday names)
//! or label formatting is required. All calendar math is UTC.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

use crate::error::{TimelineError, TimelineResult};

#[must_use]
pub fn datetime_to_unix_seconds(datetime: DateTime<Utc>) -> f64 {
    let millis = datetime.timestamp_millis();
    millis as f64 / 1_000.0
}

/// Maps logical time back to calendar time.
///
/// Sub-millisecond detail is quantized away; the engine never needs finer
/// resolution than the labels it draws.
pub fn unix_seconds_to_datetime(seconds: f64) -> TimelineResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(TimelineError::InvalidData(
            "logical time must be finite".to_owned(),
        ));
    }
    let millis = (seconds * 1_000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(TimelineError::InvalidData(format!(
            "logical time {seconds} is outside the calendar range"
        )));
    }
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .ok_or_else(|| {
            TimelineError::InvalidData(format!(
                "logical time {seconds} is outside the calendar range"
            ))
        })
}

/// Truncates sub-second detail.
#[must_use]
pub fn floor_to_second(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second(),
    )
    .single()
    .unwrap_or(datetime)
}

/// Start of the minute containing `datetime`.
#[must_use]
pub fn floor_to_minute(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        0,
    )
    .single()
    .unwrap_or(datetime)
}

/// Start of the hour containing `datetime`.
#[must_use]
pub fn floor_to_hour(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        0,
        0,
    )
    .single()
    .unwrap_or(datetime)
}

/// Start of the calendar day containing `datetime`, in UTC.
#[must_use]
pub fn floor_to_day(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(datetime.year(), datetime.month(), datetime.day(), 0, 0, 0)
        .single()
        .unwrap_or(datetime)
}

/// Replaces the time-of-day of `datetime` with `hour:00:00`.
#[must_use]
pub fn at_hour(datetime: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        datetime.year(),
        datetime.month(),
        datetime.day(),
        hour,
        0,
        0,
    )
    .single()
    .unwrap_or(datetime)
}

/// Start of the week containing `datetime`; weeks begin on Sunday.
#[must_use]
pub fn floor_to_week(datetime: DateTime<Utc>) -> DateTime<Utc> {
    let day = floor_to_day(datetime);
    let back = day.weekday().num_days_from_sunday() as i64;
    day - Duration::days(back)
}

/// Start of the month containing `datetime`.
#[must_use]
pub fn floor_to_month(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(datetime.year(), datetime.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(datetime)
}

/// Start of the year containing `datetime`.
#[must_use]
pub fn floor_to_year(datetime: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(datetime.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(datetime)
}

/// True when `datetime` sits exactly on a midnight boundary.
#[must_use]
pub fn is_day_start(datetime: DateTime<Utc>) -> bool {
    datetime.hour() == 0
        && datetime.minute() == 0
        && datetime.second() == 0
        && datetime.nanosecond() == 0
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc, Weekday};
    use chrono::Datelike;

    use super::{datetime_to_unix_seconds, floor_to_week, unix_seconds_to_datetime};

    #[test]
    fn round_trips_through_the_calendar_at_millisecond_precision() {
        let datetime = Utc.with_ymd_and_hms(2016, 1, 2, 18, 30, 15).unwrap();
        let seconds = datetime_to_unix_seconds(datetime);
        let back = unix_seconds_to_datetime(seconds).expect("valid instant");
        assert_eq!(back, datetime);
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2016-01-06 is a Wednesday; its week starts on Sunday 2016-01-03.
        let wednesday = Utc.with_ymd_and_hms(2016, 1, 6, 13, 0, 0).unwrap();
        let week = floor_to_week(wednesday);
        assert_eq!(week.weekday(), Weekday::Sun);
        assert_eq!((week.year(), week.month(), week.day()), (2016, 1, 3));
    }
}
