mod frame;
mod null_renderer;
mod primitives;
mod scene;
mod style;
mod svg_backend;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, RectPrimitive, TextHAlign,
    TextPrimitive,
};
pub use scene::{JoinStats, RetainedScene, SceneShape, ShapeKey, ShapeKind};
pub use style::RenderStyle;
pub use svg_backend::{SvgRenderer, render_svg_document};

use crate::error::TimelineResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from timeline domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()>;
}
