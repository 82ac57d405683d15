//! Host notification hooks.

use serde::{Deserialize, Serialize};

use crate::core::feed::FeedId;
use crate::core::span::TimeSpan;
use crate::core::types::ViewportSize;

/// Read-only state snapshot passed to observer hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineContext {
    pub visible_span: TimeSpan,
    pub reference_span: TimeSpan,
    pub viewport: ViewportSize,
    pub feed_count: usize,
    pub animating: bool,
}

/// Event stream exposed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    SpanChanged { start: f64, end: f64 },
    FeedAdded { feed: FeedId },
    FeedRemoved { feed: FeedId },
    Resized { width: u32, height: u32 },
    TweenStarted,
    TweenCompleted,
    Rendered,
}

/// Observer hook interface for bounded host logic.
///
/// Observers see engine events and read-only context; they cannot mutate
/// engine internals from the callback.
pub trait TimelineObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: TimelineEvent, context: TimelineContext);
}
