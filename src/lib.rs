//! timeline-rs: multi-feed timeline chart engine.
//!
//! This crate renders stacked time-series lanes (points, day bars, trend
//! lines) behind a panning and zooming viewport with calendar-aware tick
//! rulers, night shading, and an animated span reset. Rendering is
//! backend-agnostic: the engine emits deterministic primitive frames.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{TimelineConfig, TimelineEngine};
pub use error::{TimelineError, TimelineResult};
