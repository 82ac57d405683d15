//! Tick and tooltip label formatting.
//!
//! Main-ruler ticks are labeled by the largest calendar boundary they land
//! on: a tick at midnight on January 1 reads "2016", a tick at midnight
//! mid-month reads "Jan 14", a tick on the half hour reads " 6:30". Each
//! resolution slot has its own strftime pattern, replaceable through
//! [`TickLabelFormats`] and validated before use.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::time::unix_seconds_to_datetime;
use crate::error::{TimelineError, TimelineResult};

/// Date line of a tooltip.
pub const TOOLTIP_DATE_FORMAT: &str = "%a %b %e, %Y";

/// Date line of a tooltip for instants where the time of day matters.
pub const TOOLTIP_DATE_TIME_FORMAT: &str = "%a %b %e, %Y at %l:%M %p";

/// Weekday overlay pattern for the day-name ruler.
const DAY_NAME_FORMAT: &str = "%a";

/// Lane ceilings above this switch value labels to SI-prefix form.
const SI_LABEL_CEILING: f64 = 1_000.0;

/// Largest calendar boundary a tick instant lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickResolution {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Classifies a tick instant from most to least specific.
///
/// A tick only reaches a coarser slot when every finer component is zero,
/// so the weekday slot requires midnight, the week slot requires a Sunday
/// or nothing distinguishing the day, and the year slot requires exactly
/// January 1 00:00:00.000 UTC.
#[must_use]
pub fn classify_tick(datetime: DateTime<Utc>) -> TickResolution {
    if datetime.timestamp_subsec_millis() != 0 {
        TickResolution::Millisecond
    } else if datetime.second() != 0 {
        TickResolution::Second
    } else if datetime.minute() != 0 {
        TickResolution::Minute
    } else if datetime.hour() != 0 {
        TickResolution::Hour
    } else if datetime.weekday() != Weekday::Sun && datetime.day() != 1 {
        TickResolution::Day
    } else if datetime.day() != 1 {
        TickResolution::Week
    } else if datetime.month() != 1 {
        TickResolution::Month
    } else {
        TickResolution::Year
    }
}

/// One strftime pattern per resolution slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabelFormats {
    pub millisecond: String,
    pub second: String,
    pub minute: String,
    pub hour: String,
    pub day: String,
    pub week: String,
    pub month: String,
    pub year: String,
}

impl Default for TickLabelFormats {
    fn default() -> Self {
        Self {
            millisecond: "%.3f".to_owned(),
            second: ":%S".to_owned(),
            minute: "%l:%M".to_owned(),
            hour: "%l %p".to_owned(),
            day: "%b %-d".to_owned(),
            week: "%b %-d".to_owned(),
            month: "%b".to_owned(),
            year: "%Y".to_owned(),
        }
    }
}

impl TickLabelFormats {
    /// Rejects patterns chrono cannot parse, naming the offending slot.
    pub fn validate(&self) -> TimelineResult<()> {
        for (slot, pattern) in [
            ("millisecond", self.millisecond.as_str()),
            ("second", self.second.as_str()),
            ("minute", self.minute.as_str()),
            ("hour", self.hour.as_str()),
            ("day", self.day.as_str()),
            ("week", self.week.as_str()),
            ("month", self.month.as_str()),
            ("year", self.year.as_str()),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(TimelineError::InvalidData(format!(
                    "tick label pattern for the {slot} slot is not valid strftime: {pattern:?}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn pattern_for(&self, resolution: TickResolution) -> &str {
        match resolution {
            TickResolution::Millisecond => &self.millisecond,
            TickResolution::Second => &self.second,
            TickResolution::Minute => &self.minute,
            TickResolution::Hour => &self.hour,
            TickResolution::Day => &self.day,
            TickResolution::Week => &self.week,
            TickResolution::Month => &self.month,
            TickResolution::Year => &self.year,
        }
    }
}

/// Formats one main-ruler tick.
pub fn main_tick_label(timestamp: f64, formats: &TickLabelFormats) -> TimelineResult<String> {
    let datetime = unix_seconds_to_datetime(timestamp)?;
    let pattern = formats.pattern_for(classify_tick(datetime));
    Ok(datetime.format(pattern).to_string())
}

/// Weekday overlay for one tick, present only when the tick names a
/// calendar day (day, week, or month resolution).
pub fn day_name_label(timestamp: f64) -> TimelineResult<Option<String>> {
    let datetime = unix_seconds_to_datetime(timestamp)?;
    let shown = matches!(
        classify_tick(datetime),
        TickResolution::Day | TickResolution::Week | TickResolution::Month
    );
    Ok(shown.then(|| datetime.format(DAY_NAME_FORMAT).to_string()))
}

/// Lane value-axis label.
///
/// Lanes whose ceiling exceeds 1000 use an SI prefix ("2k"); otherwise
/// three significant digits with trailing zeros trimmed.
#[must_use]
pub fn value_axis_label(value: f64, lane_ceiling: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if lane_ceiling > SI_LABEL_CEILING {
        si_prefix_label(value)
    } else {
        significant_digits_label(value, 3)
    }
}

/// "Sat Jan  2, 2016"
pub fn tooltip_date_label(timestamp: f64) -> TimelineResult<String> {
    let datetime = unix_seconds_to_datetime(timestamp)?;
    Ok(datetime.format(TOOLTIP_DATE_FORMAT).to_string())
}

/// "Sat Jan  2, 2016 at  6:30 PM"
pub fn tooltip_date_time_label(timestamp: f64) -> TimelineResult<String> {
    let datetime = unix_seconds_to_datetime(timestamp)?;
    Ok(datetime.format(TOOLTIP_DATE_TIME_FORMAT).to_string())
}

fn si_prefix_label(value: f64) -> String {
    const PREFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "G"), (1e6, "M"), (1e3, "k")];
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs();
    for &(scale, prefix) in &PREFIXES {
        if magnitude >= scale {
            return format!("{}{prefix}", significant_digits_label(value / scale, 1));
        }
    }
    significant_digits_label(value, 1)
}

fn significant_digits_label(value: f64, digits: i32) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let formatted = format!("{value:.decimals$}");
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_owned()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{
        TickLabelFormats, TickResolution, classify_tick, day_name_label, main_tick_label,
        tooltip_date_label, tooltip_date_time_label, value_axis_label,
    };
    use crate::core::time::datetime_to_unix_seconds;

    fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> f64 {
        let datetime = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .expect("valid test instant");
        datetime_to_unix_seconds(datetime)
    }

    #[test]
    fn ticks_classify_by_largest_calendar_boundary() {
        let classify = |y, mo, d, h, mi, s| {
            classify_tick(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid"))
        };
        assert_eq!(classify(2016, 1, 1, 0, 0, 0), TickResolution::Year);
        assert_eq!(classify(2016, 2, 1, 0, 0, 0), TickResolution::Month);
        // 2016-01-03 is a Sunday.
        assert_eq!(classify(2016, 1, 3, 0, 0, 0), TickResolution::Week);
        // 2016-01-06 is a Wednesday.
        assert_eq!(classify(2016, 1, 6, 0, 0, 0), TickResolution::Day);
        assert_eq!(classify(2016, 1, 6, 6, 0, 0), TickResolution::Hour);
        assert_eq!(classify(2016, 1, 6, 6, 30, 0), TickResolution::Minute);
        assert_eq!(classify(2016, 1, 6, 6, 30, 15), TickResolution::Second);
    }

    #[test]
    fn sub_second_ticks_classify_as_milliseconds() {
        let datetime = Utc
            .timestamp_millis_opt(1_452_038_400_500)
            .single()
            .expect("valid");
        assert_eq!(classify_tick(datetime), TickResolution::Millisecond);
    }

    #[test]
    fn labels_follow_the_resolution_slot() {
        let formats = TickLabelFormats::default();
        assert_eq!(
            main_tick_label(instant(2016, 1, 6, 0, 0, 0), &formats).expect("label"),
            "Jan 6"
        );
        assert_eq!(
            main_tick_label(instant(2016, 1, 6, 6, 0, 0), &formats).expect("label"),
            " 6 AM"
        );
        assert_eq!(
            main_tick_label(instant(2016, 1, 6, 18, 30, 0), &formats).expect("label"),
            " 6:30"
        );
        assert_eq!(
            main_tick_label(instant(2016, 1, 1, 0, 0, 0), &formats).expect("label"),
            "2016"
        );
    }

    #[test]
    fn day_names_appear_only_for_calendar_day_ticks() {
        assert_eq!(
            day_name_label(instant(2016, 1, 6, 0, 0, 0)).expect("label"),
            Some("Wed".to_owned())
        );
        assert_eq!(
            day_name_label(instant(2016, 2, 1, 0, 0, 0)).expect("label"),
            Some("Mon".to_owned())
        );
        assert_eq!(day_name_label(instant(2016, 1, 6, 6, 0, 0)).expect("label"), None);
        assert_eq!(day_name_label(instant(2016, 1, 1, 0, 0, 0)).expect("label"), None);
    }

    #[test]
    fn invalid_patterns_are_rejected_by_slot() {
        let formats = TickLabelFormats {
            hour: "%J".to_owned(),
            ..TickLabelFormats::default()
        };
        let error = formats.validate().expect_err("pattern must be rejected");
        assert!(error.to_string().contains("hour"));
    }

    #[test]
    fn value_labels_switch_to_si_prefixes_on_large_lanes() {
        assert_eq!(value_axis_label(500.0, 800.0), "500");
        assert_eq!(value_axis_label(0.5, 1.0), "0.5");
        assert_eq!(value_axis_label(1_500.0, 2_000.0), "2k");
        assert_eq!(value_axis_label(2_000_000.0, 3_000_000.0), "2M");
        assert_eq!(value_axis_label(0.0, 2_000.0), "0");
    }

    #[test]
    fn tooltip_dates_use_padded_day_and_twelve_hour_time() {
        let noon_and_a_half = instant(2016, 1, 2, 18, 30, 0);
        assert_eq!(
            tooltip_date_label(noon_and_a_half).expect("label"),
            "Sat Jan  2, 2016"
        );
        assert_eq!(
            tooltip_date_time_label(noon_and_a_half).expect("label"),
            "Sat Jan  2, 2016 at  6:30 PM"
        );
    }
}
