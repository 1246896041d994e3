//! Rendering primitives and clipping helpers.
//!
//! These types are backend-agnostic. Child renderers turn their display data
//! into [`RenderCommand`]s, and a backend (such as the optional GPUI one)
//! paints them.

use serde::{Deserialize, Serialize};

use crate::datasource::{Connect, StepMode};
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::style::{Brush, Pen, Symbol};
use crate::transform::Transform;

/// RGBA color in linear space.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
}

/// A line segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Segment start.
    pub start: ScreenPoint,
    /// Segment end.
    pub end: ScreenPoint,
}

impl LineSegment {
    /// Create a new line segment.
    pub fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start clipping to a rectangle.
    ClipRect(ScreenRect),
    /// End clipping.
    ClipEnd,
    /// Fill a polygon.
    Fill {
        /// Polygon outline, implicitly closed.
        polygon: Vec<ScreenPoint>,
        /// Fill styling.
        brush: Brush,
    },
    /// Draw line segments.
    LineSegments {
        /// Segments to draw.
        segments: Vec<LineSegment>,
        /// Stroke styling.
        pen: Pen,
    },
    /// Draw scatter markers.
    Markers {
        /// Marker centres.
        points: Vec<ScreenPoint>,
        /// Marker shape.
        symbol: Symbol,
        /// Marker size in pixels.
        size: f32,
        /// Marker outline.
        pen: Option<Pen>,
        /// Marker fill.
        brush: Option<Brush>,
    },
}

/// Aggregated render commands.
#[derive(Debug, Default, Clone)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }
}

/// Expand a series into stair vertices for step rendering.
///
/// `Center` expects one more x than y; `Left` and `Right` expect equal
/// lengths. `None` returns the series as-is.
pub fn step_vertices(x: &[f64], y: &[f64], mode: StepMode) -> (Vec<f64>, Vec<f64>) {
    match mode {
        StepMode::None => (x.to_vec(), y.to_vec()),
        StepMode::Center => {
            let steps = y.len().min(x.len().saturating_sub(1));
            let mut xs = Vec::with_capacity(steps * 2);
            let mut ys = Vec::with_capacity(steps * 2);
            for i in 0..steps {
                xs.extend([x[i], x[i + 1]]);
                ys.extend([y[i], y[i]]);
            }
            (xs, ys)
        }
        StepMode::Left | StepMode::Right => {
            let len = x.len().min(y.len());
            let mut xs = Vec::with_capacity(len * 2);
            let mut ys = Vec::with_capacity(len * 2);
            for i in 0..len {
                if i > 0 {
                    // Horizontal run then vertical jump.
                    let held = if mode == StepMode::Left { y[i - 1] } else { y[i] };
                    xs.push(x[i]);
                    ys.push(held);
                }
                xs.push(x[i]);
                ys.push(y[i]);
                if mode == StepMode::Right && i + 1 < len {
                    xs.push(x[i]);
                    ys.push(y[i + 1]);
                }
            }
            dedup_vertices(xs, ys)
        }
    }
}

fn dedup_vertices(xs: Vec<f64>, ys: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
    let mut out_x: Vec<f64> = Vec::with_capacity(xs.len());
    let mut out_y: Vec<f64> = Vec::with_capacity(ys.len());
    for (x, y) in xs.into_iter().zip(ys) {
        if out_x.last() == Some(&x) && out_y.last() == Some(&y) {
            continue;
        }
        out_x.push(x);
        out_y.push(y);
    }
    (out_x, out_y)
}

/// Build clipped line segments from parallel coordinate slices.
///
/// A segment joins points `i` and `i + 1` only when `connect` allows it and
/// both points are finite.
pub fn build_line_segments(
    x: &[f64],
    y: &[f64],
    connect: &Connect,
    transform: &Transform,
    clip: ScreenRect,
    out: &mut Vec<LineSegment>,
) {
    out.clear();
    let len = x.len().min(y.len());
    if len < 2 {
        return;
    }
    for i in 0..len - 1 {
        if !connect.joins(i) {
            continue;
        }
        let Some(start) = transform.data_to_screen(Point::new(x[i], y[i])) else {
            continue;
        };
        let Some(end) = transform.data_to_screen(Point::new(x[i + 1], y[i + 1])) else {
            continue;
        };
        if let Some((clipped_start, clipped_end)) = clip_segment(start, end, clip) {
            out.push(LineSegment::new(clipped_start, clipped_end));
        }
    }
}

/// Split segments into dashes of length `on` separated by gaps of `off`.
///
/// The pattern restarts at each segment.
pub fn dash_segments(segments: &[LineSegment], on: f32, off: f32) -> Vec<LineSegment> {
    if on <= 0.0 || off < 0.0 {
        return segments.to_vec();
    }
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let dx = segment.end.x - segment.start.x;
        let dy = segment.end.y - segment.start.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length <= on {
            out.push(*segment);
            continue;
        }
        let at = |t: f32| ScreenPoint::new(segment.start.x + dx * t, segment.start.y + dy * t);
        let mut offset = 0.0;
        while offset < length {
            let end = (offset + on).min(length);
            out.push(LineSegment::new(at(offset / length), at(end / length)));
            offset = end + off;
        }
    }
    out
}

/// Build the polygon between a curve and a horizontal fill level.
///
/// Non-finite points split nothing here; they are simply left out.
pub fn build_fill_polygon(
    x: &[f64],
    y: &[f64],
    level: f64,
    transform: &Transform,
    out: &mut Vec<ScreenPoint>,
) {
    out.clear();
    let mut first_x = None;
    let mut last_x = None;
    for (px, py) in x.iter().zip(y) {
        if let Some(screen) = transform.data_to_screen(Point::new(*px, *py)) {
            first_x.get_or_insert(*px);
            last_x = Some(*px);
            out.push(screen);
        }
    }
    let (Some(first_x), Some(last_x)) = (first_x, last_x) else {
        return;
    };
    let (Some(close_end), Some(close_start)) = (
        transform.data_to_screen(Point::new(last_x, level)),
        transform.data_to_screen(Point::new(first_x, level)),
    ) else {
        out.clear();
        return;
    };
    out.push(close_end);
    out.push(close_start);
}

/// Build scatter marker positions, dropping non-finite and off-screen points.
pub fn build_scatter_points(
    x: &[f64],
    y: &[f64],
    transform: &Transform,
    clip: ScreenRect,
    out: &mut Vec<ScreenPoint>,
) {
    out.clear();
    for (px, py) in x.iter().zip(y) {
        let Some(screen) = transform.data_to_screen(Point::new(*px, *py)) else {
            continue;
        };
        if clip.contains(screen) {
            out.push(screen);
        }
    }
}

fn clip_segment(
    mut start: ScreenPoint,
    mut end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const TOP: u8 = 4;
    const BOTTOM: u8 = 8;

    let region = |point: ScreenPoint| {
        let mut code = 0;
        if point.x < rect.min.x {
            code |= LEFT;
        } else if point.x > rect.max.x {
            code |= RIGHT;
        }
        if point.y < rect.min.y {
            code |= TOP;
        } else if point.y > rect.max.y {
            code |= BOTTOM;
        }
        code
    };

    let mut out_start = region(start);
    let mut out_end = region(end);

    loop {
        if (out_start | out_end) == 0 {
            return Some((start, end));
        }
        if (out_start & out_end) != 0 {
            return None;
        }

        let out_code = if out_start != 0 { out_start } else { out_end };
        let (x, y) = if (out_code & TOP) != 0 {
            (
                start.x + (end.x - start.x) * (rect.min.y - start.y) / (end.y - start.y),
                rect.min.y,
            )
        } else if (out_code & BOTTOM) != 0 {
            (
                start.x + (end.x - start.x) * (rect.max.y - start.y) / (end.y - start.y),
                rect.max.y,
            )
        } else if (out_code & RIGHT) != 0 {
            (
                rect.max.x,
                start.y + (end.y - start.y) * (rect.max.x - start.x) / (end.x - start.x),
            )
        } else {
            (
                rect.min.x,
                start.y + (end.y - start.y) * (rect.min.x - start.x) / (end.x - start.x),
            )
        };

        let new_point = ScreenPoint::new(x, y);
        if out_code == out_start {
            start = new_point;
            out_start = region(start);
        } else {
            end = new_point;
            out_end = region(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Range, Viewport};

    fn unit_transform() -> (Transform, ScreenRect) {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let rect = ScreenRect::from_size(10.0, 10.0);
        (Transform::new(viewport, rect).expect("valid transform"), rect)
    }

    #[test]
    fn clip_segment_inside() {
        let rect = ScreenRect::from_size(10.0, 10.0);
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        let clipped = clip_segment(start, end, rect).expect("segment should clip");
        assert_eq!(clipped, (start, end));
    }

    #[test]
    fn clip_segment_crossing_edge() {
        let rect = ScreenRect::from_size(10.0, 10.0);
        let clipped = clip_segment(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(15.0, 5.0), rect)
            .expect("segment should clip");
        assert_eq!(clipped.1, ScreenPoint::new(10.0, 5.0));
        assert!(clip_segment(ScreenPoint::new(11.0, 1.0), ScreenPoint::new(15.0, 5.0), rect).is_none());
    }

    #[test]
    fn segments_honor_connect_and_non_finite() {
        let (transform, rect) = unit_transform();
        let x = [0.0, 0.25, 0.5, 0.75, 1.0];
        let y = [0.0, 0.5, f64::NAN, 0.5, 0.0];
        let mut out = Vec::new();
        build_line_segments(&x, &y, &Connect::All, &transform, rect, &mut out);
        assert_eq!(out.len(), 2);

        let y = [0.0, 0.5, 1.0, 0.5, 0.0];
        let connect = Connect::Array(vec![true, false, true, true, true]);
        build_line_segments(&x, &y, &connect, &transform, rect, &mut out);
        assert_eq!(out.len(), 3);

        build_line_segments(&x, &y, &Connect::Pairs, &transform, rect, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn scatter_drops_offscreen_points() {
        let (transform, rect) = unit_transform();
        let mut out = Vec::new();
        build_scatter_points(&[0.5, 2.0, f64::NAN], &[0.5, 0.5, 0.5], &transform, rect, &mut out);
        assert_eq!(out, vec![ScreenPoint::new(5.0, 5.0)]);
    }

    #[test]
    fn fill_polygon_closes_at_level() {
        let (transform, _) = unit_transform();
        let mut out = Vec::new();
        build_fill_polygon(&[0.0, 1.0], &[1.0, 1.0], 0.0, &transform, &mut out);
        assert_eq!(
            out,
            vec![
                ScreenPoint::new(0.0, 0.0),
                ScreenPoint::new(10.0, 0.0),
                ScreenPoint::new(10.0, 10.0),
                ScreenPoint::new(0.0, 10.0),
            ]
        );
    }

    #[test]
    fn center_steps_span_bin_edges() {
        let (xs, ys) = step_vertices(&[1.0, 4.0, 2.0, 3.0], &[5.0, 7.0, 6.0], StepMode::Center);
        assert_eq!(xs, vec![1.0, 4.0, 4.0, 2.0, 2.0, 3.0]);
        assert_eq!(ys, vec![5.0, 5.0, 7.0, 7.0, 6.0, 6.0]);
    }

    #[test]
    fn left_steps_hold_previous_value() {
        let (xs, ys) = step_vertices(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0], StepMode::Left);
        assert_eq!(xs, vec![0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(ys, vec![1.0, 1.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(Color::from_hex("00FF0080").map(|c| c.g), Some(1.0));
        assert_eq!(Color::from_hex("#12"), None);
    }
}
