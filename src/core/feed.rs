use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::span::TimeSpan;
use crate::core::types::{FeedShape, Sample};
use crate::error::{TimelineError, TimelineResult};

/// Opaque handle to a registered feed.
///
/// Handles stay valid for the lifetime of the registry entry and are never
/// reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedId(u32);

impl FeedId {
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// Static description of a feed: everything except its samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub label: String,
    /// Symbolic icon name shown next to the feed label, if any.
    pub icon: Option<String>,
    pub shape: FeedShape,
    /// Values at or below this threshold are treated as missing.
    pub min_valid_value: Option<f64>,
}

impl FeedDescriptor {
    pub fn new(label: impl Into<String>, shape: FeedShape) -> Self {
        Self {
            label: label.into(),
            icon: None,
            shape,
            min_valid_value: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_min_valid_value(mut self, min_valid_value: f64) -> Self {
        self.min_valid_value = Some(min_valid_value);
        self
    }
}

/// A registered feed with its canonicalized samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    id: FeedId,
    descriptor: FeedDescriptor,
    samples: Vec<Sample>,
}

impl Feed {
    #[must_use]
    pub fn id(&self) -> FeedId {
        self.id
    }

    #[must_use]
    pub fn descriptor(&self) -> &FeedDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Extent of the feed's timestamps. Gap samples count: they occupy a
    /// slot on the axis even though nothing is drawn for them.
    #[must_use]
    pub fn time_span(&self) -> Option<TimeSpan> {
        let first = self.samples.first()?.timestamp;
        let last = self.samples.last()?.timestamp;
        TimeSpan::new(first, last).ok()
    }

    /// True when any sample carries a measured value.
    ///
    /// Pure event feeds (timestamps only) answer false and are rendered
    /// without a value dimension.
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.samples.iter().any(|sample| sample.value.is_some())
    }

    /// The sample's value after the feed's validity floor is applied.
    ///
    /// `None` for gap samples and for values at or below `min_valid_value`.
    #[must_use]
    pub fn effective_value(&self, sample: Sample) -> Option<f64> {
        let value = sample.value?;
        match self.descriptor.min_valid_value {
            Some(floor) if value <= floor => None,
            _ => Some(value),
        }
    }

    /// Largest effective value, used to size the feed's vertical scale.
    #[must_use]
    pub fn value_ceiling(&self) -> Option<f64> {
        self.samples
            .iter()
            .filter_map(|&sample| self.effective_value(sample))
            .fold(None, |ceiling, value| {
                Some(ceiling.map_or(value, |c: f64| c.max(value)))
            })
    }
}

/// Insertion-ordered set of feeds.
///
/// Lane order on screen is registry order, so iteration order matters; the
/// registry is backed by an [`IndexMap`] for that reason.
#[derive(Debug, Default, Clone)]
pub struct FeedRegistry {
    feeds: IndexMap<FeedId, Feed>,
    next_id: u32,
}

impl FeedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feed and hands back its id.
    ///
    /// Samples are canonicalized on the way in: non-finite entries are
    /// dropped, the rest are sorted by timestamp and duplicate timestamps
    /// collapse to the latest occurrence.
    pub fn add_feed(
        &mut self,
        descriptor: FeedDescriptor,
        samples: Vec<Sample>,
    ) -> TimelineResult<FeedId> {
        let samples = canonicalize_samples(&descriptor.label, samples)?;
        let id = FeedId(self.next_id);
        self.next_id += 1;
        self.feeds.insert(
            id,
            Feed {
                id,
                descriptor,
                samples,
            },
        );
        Ok(id)
    }

    /// Replaces the samples of an existing feed.
    pub fn update_feed(&mut self, id: FeedId, samples: Vec<Sample>) -> TimelineResult<()> {
        let Some(feed) = self.feeds.get_mut(&id) else {
            return Err(TimelineError::InvalidData(format!(
                "unknown feed id {}",
                id.index()
            )));
        };
        feed.samples = canonicalize_samples(&feed.descriptor.label, samples)?;
        Ok(())
    }

    pub fn remove_feed(&mut self, id: FeedId) -> TimelineResult<()> {
        if self.feeds.shift_remove(&id).is_none() {
            return Err(TimelineError::InvalidData(format!(
                "unknown feed id {}",
                id.index()
            )));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.feeds.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: FeedId) -> Option<&Feed> {
        self.feeds.get(&id)
    }

    /// Feeds in registration order, which is also lane order.
    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.values()
    }

    /// Zero-based lane of a feed, by registration order.
    #[must_use]
    pub fn lane_index_of(&self, id: FeedId) -> Option<usize> {
        self.feeds.get_index_of(&id)
    }

    /// Union of every feed's time extent.
    #[must_use]
    pub fn full_span(&self) -> Option<TimeSpan> {
        self.feeds
            .values()
            .filter_map(Feed::time_span)
            .reduce(TimeSpan::union)
    }
}

fn canonicalize_samples(label: &str, raw: Vec<Sample>) -> TimelineResult<Vec<Sample>> {
    let input_len = raw.len();
    let mut samples: Vec<Sample> = raw
        .into_iter()
        .filter(|sample| {
            sample.timestamp.is_finite() && sample.value.is_none_or(f64::is_finite)
        })
        .collect();

    let dropped = input_len - samples.len();
    if dropped > 0 {
        warn!(feed = label, dropped, "dropped non-finite samples during canonicalization");
    }

    samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    let before_dedup = samples.len();
    samples.dedup_by(|next, kept| {
        if next.timestamp == kept.timestamp {
            *kept = *next;
            true
        } else {
            false
        }
    });
    let collapsed = before_dedup - samples.len();
    if collapsed > 0 {
        warn!(feed = label, collapsed, "collapsed duplicate timestamps, keeping the latest");
    }

    if samples.is_empty() {
        return Err(TimelineError::InvalidData(format!(
            "feed \"{label}\" has no usable samples"
        )));
    }
    Ok(samples)
}
