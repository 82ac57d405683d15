//! Retained shape store with enter/update/exit reconciliation.
//!
//! Shapes are keyed by owning feed, shape class, and sample (or day-bucket)
//! timestamp; the class keeps a marker dot and a trend segment anchored at
//! the same sample distinct. Reconciling a feed against freshly projected
//! geometry inserts new keys, repositions surviving ones, and drops
//! vanished ones; reconciling twice with identical input reports zero
//! enters and exits. The scene doubles as the hit-test index for tooltips.

use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use ordered_float::OrderedFloat;

use crate::core::feed::FeedId;
use crate::render::{CirclePrimitive, LinePrimitive, RectPrimitive};

/// Shape class half of a [`ShapeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Dot,
    Bar,
    Segment,
}

/// Identity of one retained shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeKey {
    pub feed: FeedId,
    pub kind: ShapeKind,
    pub timestamp: OrderedFloat<f64>,
}

impl ShapeKey {
    #[must_use]
    pub fn new(feed: FeedId, kind: ShapeKind, timestamp: f64) -> Self {
        Self {
            feed,
            kind,
            timestamp: OrderedFloat(timestamp),
        }
    }
}

/// Geometry retained under one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneShape {
    Dot(CirclePrimitive),
    Bar(RectPrimitive),
    Segment(LinePrimitive),
}

impl SceneShape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Dot(_) => ShapeKind::Dot,
            Self::Bar(_) => ShapeKind::Bar,
            Self::Segment(_) => ShapeKind::Segment,
        }
    }
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Keyed shape store surviving across render passes.
#[derive(Debug, Default, Clone)]
pub struct RetainedScene {
    shapes: IndexMap<ShapeKey, SceneShape>,
}

impl RetainedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles one feed's retained shapes against `incoming`.
    ///
    /// Keys present in both sets are updated in place (preserving scene
    /// order), new keys are appended, and keys of this feed absent from
    /// `incoming` are removed. Shapes of other feeds are untouched.
    pub fn reconcile_feed(&mut self, feed: FeedId, incoming: &[(f64, SceneShape)]) -> JoinStats {
        let mut stats = JoinStats::default();
        let mut seen: HashSet<ShapeKey> = HashSet::with_capacity(incoming.len());

        for &(timestamp, shape) in incoming {
            let key = ShapeKey::new(feed, shape.kind(), timestamp);
            seen.insert(key);
            match self.shapes.entry(key) {
                Entry::Occupied(mut occupied) => {
                    occupied.insert(shape);
                    stats.updated += 1;
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(shape);
                    stats.entered += 1;
                }
            }
        }

        let stale: Vec<ShapeKey> = self
            .shapes
            .keys()
            .filter(|key| key.feed == feed && !seen.contains(key))
            .copied()
            .collect();
        for key in &stale {
            self.shapes.shift_remove(key);
        }
        stats.exited = stale.len();

        stats
    }

    /// Drops every shape belonging to `feed`; returns the removed count.
    pub fn remove_feed(&mut self, feed: FeedId) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|key, _| key.feed != feed);
        before - self.shapes.len()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> impl Iterator<Item = (&ShapeKey, &SceneShape)> {
        self.shapes.iter()
    }

    pub fn feed_shapes(&self, feed: FeedId) -> impl Iterator<Item = (&ShapeKey, &SceneShape)> {
        self.shapes.iter().filter(move |(key, _)| key.feed == feed)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::feed::FeedId;
    use crate::render::{CirclePrimitive, Color, LinePrimitive};

    use super::{RetainedScene, SceneShape};

    fn dot(x: f64) -> SceneShape {
        SceneShape::Dot(CirclePrimitive::new(x, 10.0, 1.5, Color::gray(0.4)))
    }

    fn segment(x1: f64, x2: f64) -> SceneShape {
        SceneShape::Segment(LinePrimitive::new(x1, 10.0, x2, 12.0, 1.0, Color::gray(0.4)))
    }

    #[test]
    fn second_identical_pass_reports_no_enters_or_exits() {
        let mut scene = RetainedScene::new();
        let feed = FeedId::from_raw(0);
        let incoming = vec![(1.0, dot(10.0)), (2.0, dot(20.0))];

        let first = scene.reconcile_feed(feed, &incoming);
        assert_eq!((first.entered, first.updated, first.exited), (2, 0, 0));

        let second = scene.reconcile_feed(feed, &incoming);
        assert_eq!((second.entered, second.updated, second.exited), (0, 2, 0));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn dot_and_segment_at_same_timestamp_are_retained_separately() {
        let mut scene = RetainedScene::new();
        let feed = FeedId::from_raw(0);
        let incoming = vec![(1.0, dot(10.0)), (1.0, segment(10.0, 20.0))];

        let stats = scene.reconcile_feed(feed, &incoming);
        assert_eq!((stats.entered, stats.exited), (2, 0));
        assert_eq!(scene.len(), 2);
    }
}
