//! Ruler selection for the stacked time axes.
//!
//! The axis area is four stacked rulers: adaptive main labels, a weekday
//! overlay, and two unlabeled gridline sets at day and week boundaries.
//! Each ruler carries a visibility threshold in days of visible span;
//! zooming out past a threshold swaps that ruler for a yearly stand-in so
//! the axis never goes empty.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{TimelineError, TimelineResult};

/// One tick ruler along the bottom edge of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickRuler {
    /// Multi-resolution labels whose cadence adapts to the zoom level.
    MainLabel,
    /// Abbreviated weekday names below the main labels.
    DayName,
    /// Unlabeled gridlines at UTC day boundaries.
    DayGrid,
    /// Unlabeled gridlines at week boundaries.
    WeekGrid,
    /// Year-boundary stand-in for a ruler hidden at the current zoom.
    HiddenYearly,
}

impl TickRuler {
    /// The four slots that make up the axis area, top to bottom.
    pub const SLOTS: [Self; 4] = [Self::MainLabel, Self::DayName, Self::DayGrid, Self::WeekGrid];
}

/// Per-ruler visibility thresholds in days of visible span.
///
/// A ruler stays visible while the visible span is at most its threshold;
/// a threshold of zero disables the limit entirely. Thresholds are plain
/// configuration and can be retuned per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RulerVisibilityPolicy {
    pub main_label_max_days: f64,
    pub day_name_max_days: f64,
    pub day_grid_max_days: f64,
    pub week_grid_max_days: f64,
}

impl Default for RulerVisibilityPolicy {
    fn default() -> Self {
        Self {
            main_label_max_days: 0.0,
            day_name_max_days: 60.0,
            day_grid_max_days: 60.0,
            week_grid_max_days: 90.0,
        }
    }
}

impl RulerVisibilityPolicy {
    /// Validates thresholds and returns the policy on success.
    pub fn validate(self) -> TimelineResult<Self> {
        for (slot, threshold) in [
            ("main label", self.main_label_max_days),
            ("day name", self.day_name_max_days),
            ("day grid", self.day_grid_max_days),
            ("week grid", self.week_grid_max_days),
        ] {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "{slot} ruler threshold must be a finite number of days >= 0, got {threshold}"
                )));
            }
        }
        Ok(self)
    }

    /// Threshold for one ruler; the yearly stand-in has none.
    #[must_use]
    pub fn threshold_days(&self, ruler: TickRuler) -> f64 {
        match ruler {
            TickRuler::MainLabel => self.main_label_max_days,
            TickRuler::DayName => self.day_name_max_days,
            TickRuler::DayGrid => self.day_grid_max_days,
            TickRuler::WeekGrid => self.week_grid_max_days,
            TickRuler::HiddenYearly => 0.0,
        }
    }

    /// Whether `ruler` is shown when the visible span is `span_in_days` long.
    #[must_use]
    pub fn is_visible(&self, ruler: TickRuler, span_in_days: f64) -> bool {
        let threshold = self.threshold_days(ruler);
        threshold <= 0.0 || span_in_days <= threshold
    }

    /// Resolves each axis slot for the given span length.
    ///
    /// Slots hidden at this zoom level resolve to
    /// [`TickRuler::HiddenYearly`] rather than disappearing, so the
    /// result always has four entries in slot order.
    #[must_use]
    pub fn select_rulers(&self, span_in_days: f64) -> SmallVec<[TickRuler; 4]> {
        TickRuler::SLOTS
            .into_iter()
            .map(|ruler| {
                if self.is_visible(ruler, span_in_days) {
                    ruler
                } else {
                    TickRuler::HiddenYearly
                }
            })
            .collect()
    }
}
