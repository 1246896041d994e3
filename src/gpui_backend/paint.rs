use gpui::{
    BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, Window, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{Color, LineSegment, RenderCommand, RenderList};
use crate::style::{Brush, Pen, Symbol};

pub(crate) fn paint_list(list: &RenderList, window: &mut Window) {
    let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
    for command in list.commands() {
        match command {
            RenderCommand::ClipRect(rect) => {
                clip_stack.push(ContentMask {
                    bounds: to_bounds(*rect),
                });
            }
            RenderCommand::ClipEnd => {
                clip_stack.pop();
            }
            RenderCommand::Fill { polygon, brush } => {
                with_clip(window, &clip_stack, |window| {
                    paint_polygon(window, polygon, *brush);
                });
            }
            RenderCommand::LineSegments { segments, pen } => {
                with_clip(window, &clip_stack, |window| {
                    paint_lines(window, segments, *pen);
                });
            }
            RenderCommand::Markers {
                points,
                symbol,
                size,
                pen,
                brush,
            } => {
                with_clip(window, &clip_stack, |window| {
                    paint_markers(window, points, *symbol, *size, *pen, *brush);
                });
            }
        }
    }
}

fn paint_lines(window: &mut Window, segments: &[LineSegment], pen: Pen) {
    if segments.is_empty() {
        return;
    }
    let mut builder = PathBuilder::stroke(px(pen.width.max(0.5)));
    for segment in segments {
        builder.move_to(point(px(segment.start.x), px(segment.start.y)));
        builder.line_to(point(px(segment.end.x), px(segment.end.y)));
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(pen.color));
    }
}

fn paint_polygon(window: &mut Window, polygon: &[ScreenPoint], brush: Brush) {
    let Some((first, rest)) = polygon.split_first() else {
        return;
    };
    let mut builder = PathBuilder::fill();
    builder.move_to(point(px(first.x), px(first.y)));
    for vertex in rest {
        builder.line_to(point(px(vertex.x), px(vertex.y)));
    }
    builder.line_to(point(px(first.x), px(first.y)));
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(brush.color));
    }
}

fn paint_markers(
    window: &mut Window,
    points: &[ScreenPoint],
    symbol: Symbol,
    size: f32,
    pen: Option<Pen>,
    brush: Option<Brush>,
) {
    let half = size.max(2.0) * 0.5;
    let fill = brush.map_or(transparent(), |brush| to_rgba(brush.color));
    match symbol {
        Symbol::Circle | Symbol::Square => {
            let corner = if symbol == Symbol::Circle { half } else { 0.0 };
            let (border, border_width) =
                pen.map_or((transparent(), 0.0), |pen| (to_rgba(pen.color), pen.width));
            for pt in points {
                let bounds = Bounds::from_corners(
                    point(px(pt.x - half), px(pt.y - half)),
                    point(px(pt.x + half), px(pt.y + half)),
                );
                window.paint_quad(quad(
                    bounds,
                    Corners::all(px(corner)),
                    fill,
                    Edges::all(px(border_width)),
                    border,
                    BorderStyle::default(),
                ));
            }
        }
        Symbol::Triangle | Symbol::Diamond => {
            let outline: &[(f32, f32)] = if symbol == Symbol::Triangle {
                &[(-1.0, -1.0), (1.0, -1.0), (0.0, 1.0)]
            } else {
                &[(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)]
            };
            for pt in points {
                let polygon: Vec<ScreenPoint> = outline
                    .iter()
                    .map(|(dx, dy)| ScreenPoint::new(pt.x + dx * half, pt.y + dy * half))
                    .collect();
                if let Some(brush) = brush {
                    paint_polygon(window, &polygon, brush);
                }
                if let Some(pen) = pen {
                    let segments: Vec<LineSegment> = polygon
                        .iter()
                        .zip(polygon.iter().cycle().skip(1))
                        .map(|(start, end)| LineSegment::new(*start, *end))
                        .collect();
                    paint_lines(window, &segments, pen);
                }
            }
        }
        Symbol::Plus | Symbol::Cross | Symbol::Star => {
            let Some(stroke) = pen.or_else(|| brush.map(|brush| Pen::new(brush.color))) else {
                return;
            };
            let diagonal = half * std::f32::consts::FRAC_1_SQRT_2;
            let mut segments = Vec::new();
            for pt in points {
                let at = |dx: f32, dy: f32| ScreenPoint::new(pt.x + dx, pt.y + dy);
                if symbol != Symbol::Cross {
                    segments.push(LineSegment::new(at(-half, 0.0), at(half, 0.0)));
                    segments.push(LineSegment::new(at(0.0, -half), at(0.0, half)));
                }
                if symbol != Symbol::Plus {
                    segments.push(LineSegment::new(
                        at(-diagonal, -diagonal),
                        at(diagonal, diagonal),
                    ));
                    segments.push(LineSegment::new(
                        at(-diagonal, diagonal),
                        at(diagonal, -diagonal),
                    ));
                }
            }
            paint_lines(window, &segments, stroke);
        }
    }
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

fn transparent() -> gpui::Rgba {
    to_rgba(Color::new(0.0, 0.0, 0.0, 0.0))
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn to_bounds(rect: ScreenRect) -> Bounds<Pixels> {
    Bounds::from_corners(
        point(px(rect.min.x), px(rect.min.y)),
        point(px(rect.max.x), px(rect.max.y)),
    )
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
