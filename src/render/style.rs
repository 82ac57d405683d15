use crate::error::{TimelineError, TimelineResult};
use crate::render::Color;

/// Style contract for the current render frame.
///
/// Defaults reproduce the widget's stock appearance: a white plot with a
/// light outer border, pale calendar gridlines, slate night shading, and
/// small dark sample markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background_color: Color,
    pub frame_border_color: Color,
    pub frame_border_width: f64,
    pub night_fill: Color,
    pub baseline_color: Color,
    pub baseline_width: f64,
    pub main_tick_color: Color,
    pub main_tick_width: f64,
    pub day_grid_color: Color,
    pub day_grid_width: f64,
    pub week_grid_color: Color,
    pub week_grid_width: f64,
    /// Radius of markers in feeds that carry no measurement values.
    pub event_point_radius_px: f64,
    pub event_point_color: Color,
    pub point_radius_px: f64,
    pub point_color: Color,
    /// Markers for gap or suppressed samples shrink to this radius.
    pub invalid_point_radius_px: f64,
    /// Opacity applied to gap or suppressed sample markers.
    pub invalid_point_alpha: f64,
    pub bar_fill: Color,
    /// Gap carved off each day bar's right edge.
    pub bar_gap_px: f64,
    pub trend_color: Color,
    pub trend_width: f64,
    pub label_color: Color,
    pub label_font_size_px: f64,
    /// Horizontal inset of the right-anchored feed label from the plot's
    /// left edge.
    pub feed_label_offset_px: f64,
    pub main_label_padding_px: f64,
    pub day_name_label_padding_px: f64,
    pub value_tick_length_px: f64,
    pub value_label_padding_px: f64,
    pub value_tick_count: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background_color: Color::rgb(1.0, 1.0, 1.0),
            frame_border_color: Color::gray(0.93),
            frame_border_width: 3.0,
            night_fill: Color::rgba(0.85, 0.88, 0.94, 0.55),
            baseline_color: Color::gray(0.93),
            baseline_width: 1.0,
            main_tick_color: Color::gray(0.90),
            main_tick_width: 1.0,
            day_grid_color: Color::gray(0.90),
            day_grid_width: 1.0,
            week_grid_color: Color::gray(0.82),
            week_grid_width: 1.0,
            event_point_radius_px: 5.0,
            event_point_color: Color::gray(1.0 / 3.0),
            point_radius_px: 1.5,
            point_color: Color::gray(0.4),
            invalid_point_radius_px: 0.5,
            invalid_point_alpha: 0.85,
            bar_fill: Color::gray(0.4),
            bar_gap_px: 0.5,
            trend_color: Color::gray(0.4),
            trend_width: 1.0,
            label_color: Color::gray(0.13),
            label_font_size_px: 10.0,
            feed_label_offset_px: 30.0,
            main_label_padding_px: 6.0,
            day_name_label_padding_px: 18.0,
            value_tick_length_px: 4.0,
            value_label_padding_px: 5.0,
            value_tick_count: 5,
        }
    }
}

impl RenderStyle {
    pub fn validate(self) -> TimelineResult<Self> {
        for color in [
            self.background_color,
            self.frame_border_color,
            self.night_fill,
            self.baseline_color,
            self.main_tick_color,
            self.day_grid_color,
            self.week_grid_color,
            self.event_point_color,
            self.point_color,
            self.bar_fill,
            self.trend_color,
            self.label_color,
        ] {
            color.validate()?;
        }

        for (name, value) in [
            ("frame border width", self.frame_border_width),
            ("baseline width", self.baseline_width),
            ("main tick width", self.main_tick_width),
            ("day grid width", self.day_grid_width),
            ("week grid width", self.week_grid_width),
            ("event point radius", self.event_point_radius_px),
            ("point radius", self.point_radius_px),
            ("invalid point radius", self.invalid_point_radius_px),
            ("trend width", self.trend_width),
            ("label font size", self.label_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }

        if !self.invalid_point_alpha.is_finite() || !(0.0..=1.0).contains(&self.invalid_point_alpha)
        {
            return Err(TimelineError::InvalidData(
                "invalid point alpha must be finite and in [0, 1]".to_owned(),
            ));
        }
        if !self.bar_gap_px.is_finite() || self.bar_gap_px < 0.0 {
            return Err(TimelineError::InvalidData(
                "bar gap must be finite and >= 0".to_owned(),
            ));
        }
        if self.value_tick_count == 0 {
            return Err(TimelineError::InvalidData(
                "value tick count must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}
