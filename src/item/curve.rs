//! Line curve child renderer.

use serde::{Deserialize, Serialize};

use crate::datasource::{Connect, StepMode};
use crate::geom::ScreenRect;
use crate::render::{
    RenderCommand, RenderList, build_fill_polygon, build_line_segments, dash_segments,
    step_vertices,
};
use crate::style::{Brush, Pen};
use crate::transform::Transform;

/// Options of the curve renderer. Values are stored exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    /// Line pen; `None` hides the line.
    pub pen: Option<Pen>,
    /// Pen drawn underneath the main pen.
    pub shadow_pen: Option<Pen>,
    /// Y level to fill down (or up) to.
    pub fill_level: Option<f64>,
    /// Brush for the area between the curve and the fill level.
    pub fill_brush: Option<Brush>,
    /// Connectivity of the displayed points.
    pub connect: Connect,
    /// Step rendering mode.
    pub step_mode: StepMode,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            pen: Some(Pen::default()),
            shadow_pen: None,
            fill_level: None,
            fill_brush: None,
            connect: Connect::All,
            step_mode: StepMode::None,
        }
    }
}

/// Draws the display dataset as a polyline.
#[derive(Debug, Clone, Default)]
pub struct CurveItem {
    opts: CurveOptions,
    x: Vec<f64>,
    y: Vec<f64>,
    generation: u64,
}

impl CurveItem {
    /// Access the curve options.
    pub fn opts(&self) -> &CurveOptions {
        &self.opts
    }

    /// Displayed coordinates.
    pub fn data(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Redraw generation; increments whenever data or options change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check whether anything would be drawn.
    pub fn is_visible(&self) -> bool {
        self.opts.pen.is_some()
            || self.opts.shadow_pen.is_some()
            || (self.opts.fill_level.is_some() && self.opts.fill_brush.is_some())
    }

    pub(crate) fn update_opts(&mut self, f: impl FnOnce(&mut CurveOptions)) {
        f(&mut self.opts);
        self.request_redraw();
    }

    pub(crate) fn set_data(&mut self, x: Vec<f64>, y: Vec<f64>, connect: Connect) {
        self.x = x;
        self.y = y;
        self.opts.connect = connect;
        self.request_redraw();
    }

    fn request_redraw(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Append the commands that draw this curve.
    pub fn render(&self, transform: &Transform, clip: ScreenRect, out: &mut RenderList) {
        if self.y.is_empty() || !self.is_visible() {
            return;
        }
        let stepped;
        let joined = Connect::All;
        let (x, y, connect) = if self.opts.step_mode == StepMode::None {
            (&self.x[..], &self.y[..], &self.opts.connect)
        } else {
            stepped = step_vertices(&self.x, &self.y, self.opts.step_mode);
            (&stepped.0[..], &stepped.1[..], &joined)
        };

        if let (Some(level), Some(brush)) = (self.opts.fill_level, self.opts.fill_brush) {
            let mut polygon = Vec::new();
            build_fill_polygon(x, y, level, transform, &mut polygon);
            if polygon.len() > 2 {
                out.push(RenderCommand::Fill { polygon, brush });
            }
        }

        for pen in [self.opts.shadow_pen, self.opts.pen].into_iter().flatten() {
            let mut segments = Vec::new();
            build_line_segments(x, y, connect, transform, clip, &mut segments);
            if let Some((on, off)) = pen.style.dash_pattern(pen.width) {
                segments = dash_segments(&segments, on, off);
            }
            if !segments.is_empty() {
                out.push(RenderCommand::LineSegments { segments, pen });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;
    use crate::view::{Range, Viewport};

    #[test]
    fn option_updates_bump_generation() {
        let mut curve = CurveItem::default();
        let before = curve.generation();
        let pen = Pen::new(Color::WHITE);
        curve.update_opts(|opts| opts.pen = Some(pen));
        assert_eq!(curve.opts().pen, Some(pen));
        assert!(curve.generation() > before);
    }

    #[test]
    fn render_draws_shadow_then_pen() {
        let mut curve = CurveItem::default();
        curve.update_opts(|opts| opts.shadow_pen = Some(Pen::new(Color::BLACK).with_width(3.0)));
        curve.set_data(vec![0.0, 1.0], vec![0.0, 1.0], Connect::All);
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let rect = ScreenRect::from_size(10.0, 10.0);
        let transform = Transform::new(viewport, rect).unwrap();
        let mut list = RenderList::new();
        curve.render(&transform, rect, &mut list);
        let widths: Vec<f32> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::LineSegments { pen, .. } => Some(pen.width),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![3.0, 1.0]);
    }

    #[test]
    fn dashed_pen_splits_segments() {
        let mut curve = CurveItem::default();
        curve.update_opts(|opts| {
            opts.pen = Some(Pen::new(Color::WHITE).with_style(crate::style::PenStyle::Dash))
        });
        curve.set_data(vec![0.0, 1.0], vec![0.5, 0.5], Connect::All);
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let rect = ScreenRect::from_size(60.0, 10.0);
        let mut list = RenderList::new();
        curve.render(&Transform::new(viewport, rect).unwrap(), rect, &mut list);
        let [RenderCommand::LineSegments { segments, .. }] = list.commands() else {
            panic!("expected one stroke");
        };
        assert_eq!(segments.len(), 10);
    }

    #[test]
    fn hidden_curve_renders_nothing() {
        let mut curve = CurveItem::default();
        curve.update_opts(|opts| opts.pen = None);
        curve.set_data(vec![0.0, 1.0], vec![0.0, 1.0], Connect::All);
        assert!(!curve.is_visible());
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let rect = ScreenRect::from_size(10.0, 10.0);
        let mut list = RenderList::new();
        curve.render(&Transform::new(viewport, rect).unwrap(), rect, &mut list);
        assert!(list.commands().is_empty());
    }
}
