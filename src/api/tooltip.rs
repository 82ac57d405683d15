//! Pointer hit-testing against retained sample dots.

use ordered_float::OrderedFloat;

use crate::api::tick_format::{tooltip_date_label, tooltip_date_time_label};
use crate::core::feed::{Feed, FeedId, FeedRegistry};
use crate::error::{TimelineError, TimelineResult};
use crate::render::{RetainedScene, SceneShape};

/// Tooltip content for one sample, anchored at the dot center.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipModel {
    pub feed: FeedId,
    pub feed_label: String,
    pub timestamp: f64,
    /// Display lines: a date line, plus a value line (or "Missing") for
    /// feeds that carry measurements.
    pub rows: Vec<String>,
    pub x_px: f64,
    pub y_px: f64,
}

/// Finds the sample dot nearest to (`x_px`, `y_px`) within `radius_px`
/// across all feeds and builds its tooltip.
///
/// Returns `None` when no dot is close enough. Bars and trend segments
/// are not hit-tested; every sample that can carry a tooltip is also
/// projected as a dot.
pub fn tooltip_at(
    registry: &FeedRegistry,
    scene: &RetainedScene,
    x_px: f64,
    y_px: f64,
    radius_px: f64,
) -> TimelineResult<Option<TooltipModel>> {
    if !x_px.is_finite() || !y_px.is_finite() {
        return Err(TimelineError::InvalidData(format!(
            "hit-test position must be finite, got ({x_px}, {y_px})"
        )));
    }
    if !radius_px.is_finite() || radius_px <= 0.0 {
        return Err(TimelineError::InvalidData(format!(
            "hit-test radius must be finite and positive, got {radius_px}"
        )));
    }

    let limit = OrderedFloat(radius_px * radius_px);
    let mut best: Option<(OrderedFloat<f64>, FeedId, f64, f64, f64)> = None;
    for (key, shape) in scene.shapes() {
        let SceneShape::Dot(circle) = shape else {
            continue;
        };
        let dx = circle.cx - x_px;
        let dy = circle.cy - y_px;
        let distance_squared = OrderedFloat(dx * dx + dy * dy);
        if distance_squared > limit {
            continue;
        }
        let closer = best
            .as_ref()
            .is_none_or(|(current, ..)| distance_squared < *current);
        if closer {
            best = Some((
                distance_squared,
                key.feed,
                key.timestamp.into_inner(),
                circle.cx,
                circle.cy,
            ));
        }
    }

    let Some((_, feed_id, timestamp, cx, cy)) = best else {
        return Ok(None);
    };
    let feed = registry.get(feed_id).ok_or_else(|| {
        TimelineError::InvalidData("scene references a feed missing from the registry".to_owned())
    })?;

    Ok(Some(TooltipModel {
        feed: feed_id,
        feed_label: feed.descriptor().label.clone(),
        timestamp,
        rows: tooltip_rows(feed, timestamp)?,
        x_px: cx,
        y_px: cy,
    }))
}

fn tooltip_rows(feed: &Feed, timestamp: f64) -> TimelineResult<Vec<String>> {
    if !feed.has_values() {
        return Ok(vec![tooltip_date_time_label(timestamp)?]);
    }

    let value_row = feed
        .samples()
        .binary_search_by(|sample| sample.timestamp.total_cmp(&timestamp))
        .ok()
        .and_then(|index| feed.effective_value(feed.samples()[index]))
        .map_or_else(|| "Missing".to_owned(), |value| format!("{value}"));
    Ok(vec![tooltip_date_label(timestamp)?, value_row])
}
