//! Core timeline math: spans, scales, feeds, and calendar helpers.
//!
//! Everything in this layer is deterministic and free of render concerns;
//! the `api` layer composes these pieces into the engine facade.

pub mod feed;
pub mod lane;
pub mod night;
pub mod project;
pub mod scale;
pub mod span;
pub mod time;
pub mod types;

pub use feed::{Feed, FeedDescriptor, FeedId, FeedRegistry};
pub use lane::{LaneBand, LaneLayoutConfig, ValueScale, layout_lanes, nice_value_ticks};
pub use night::{NightShadeConfig, night_intervals};
pub use scale::TimePixelScale;
pub use span::{MIN_SPAN_SECONDS, SECONDS_PER_DAY, TimeSpan};
pub use types::{FeedShape, Sample, ViewportSize};
