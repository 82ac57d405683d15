use std::fmt::Write as _;

use crate::error::TimelineResult;
use crate::render::primitives::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, RectPrimitive, TextHAlign,
    TextPrimitive,
};
use crate::render::{RenderFrame, Renderer};

const DASH_PATTERN: &str = "4 3";

/// SVG document backend.
///
/// Each render pass serializes the frame into a standalone `<svg>` document
/// and keeps it so callers can fetch markup after drawing without holding a
/// canvas. Primitives are emitted in frame paint order.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    last_document: Option<String>,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_document(&self) -> Option<&str> {
        self.last_document.as_deref()
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()> {
        self.last_document = Some(render_svg_document(frame)?);
        Ok(())
    }
}

/// Serializes a validated frame into a standalone SVG document.
pub fn render_svg_document(frame: &RenderFrame) -> TimelineResult<String> {
    frame.validate()?;

    let width = frame.viewport.width();
    let height = frame.viewport.height();
    let mut svg = String::with_capacity(128 + frame.primitive_count() * 96);
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"sans-serif\">"
    );

    for rect in &frame.rects {
        push_rect(&mut svg, rect);
    }
    for line in &frame.lines {
        push_line(&mut svg, line);
    }
    for circle in &frame.circles {
        push_circle(&mut svg, circle);
    }
    for text in &frame.texts {
        push_text(&mut svg, text);
    }

    let _ = writeln!(svg, "</svg>");
    Ok(svg)
}

fn push_rect(svg: &mut String, rect: &RectPrimitive) {
    let _ = write!(
        svg,
        "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        css_color(rect.fill)
    );
    push_opacity(svg, "fill-opacity", rect.fill);
    let _ = writeln!(svg, "/>");
}

fn push_line(svg: &mut String, line: &LinePrimitive) {
    let _ = write!(
        svg,
        "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"",
        line.x1,
        line.y1,
        line.x2,
        line.y2,
        css_color(line.color),
        line.stroke_width
    );
    push_opacity(svg, "stroke-opacity", line.color);
    if line.stroke_style == LineStrokeStyle::Dashed {
        let _ = write!(svg, " stroke-dasharray=\"{DASH_PATTERN}\"");
    }
    let _ = writeln!(svg, "/>");
}

fn push_circle(svg: &mut String, circle: &CirclePrimitive) {
    let _ = write!(
        svg,
        "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"",
        circle.cx,
        circle.cy,
        circle.radius,
        css_color(circle.fill)
    );
    push_opacity(svg, "fill-opacity", circle.fill);
    let _ = writeln!(svg, "/>");
}

fn push_text(svg: &mut String, text: &TextPrimitive) {
    let _ = write!(
        svg,
        "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.1}\" fill=\"{}\"",
        text.x,
        text.y,
        text.font_size_px,
        css_color(text.color)
    );
    push_opacity(svg, "fill-opacity", text.color);
    if text.h_align != TextHAlign::Left {
        let _ = write!(svg, " text-anchor=\"{}\"", text_anchor(text.h_align));
    }
    let _ = writeln!(svg, ">{}</text>", escape_text(&text.text));
}

fn push_opacity(svg: &mut String, attribute: &str, color: Color) {
    if color.alpha < 1.0 {
        let _ = write!(svg, " {attribute}=\"{:.3}\"", color.alpha);
    }
}

fn css_color(color: Color) -> String {
    format!(
        "rgb({},{},{})",
        channel_byte(color.red),
        channel_byte(color.green),
        channel_byte(color.blue)
    )
}

fn channel_byte(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn text_anchor(align: TextHAlign) -> &'static str {
    match align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
