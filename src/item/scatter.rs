//! Point marker child renderer.

use serde::{Deserialize, Serialize};

use crate::geom::ScreenRect;
use crate::render::{RenderCommand, RenderList, build_scatter_points};
use crate::style::{Brush, Pen, Symbol};
use crate::transform::Transform;

/// Options of the marker renderer. Values are stored exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterOptions {
    /// Marker shape; `None` hides the markers.
    pub symbol: Option<Symbol>,
    /// Marker outline.
    pub pen: Option<Pen>,
    /// Marker fill.
    pub brush: Option<Brush>,
    /// Marker size in pixels.
    pub size: f32,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            symbol: None,
            pen: Some(Pen::default()),
            brush: Some(Brush::new(crate::render::Color::new(0.39, 0.39, 0.59, 1.0))),
            size: 10.0,
        }
    }
}

/// Draws the display dataset as markers.
#[derive(Debug, Clone, Default)]
pub struct ScatterItem {
    opts: ScatterOptions,
    x: Vec<f64>,
    y: Vec<f64>,
    generation: u64,
}

impl ScatterItem {
    /// Access the marker options.
    pub fn opts(&self) -> &ScatterOptions {
        &self.opts
    }

    /// Displayed coordinates; empty while no symbol is set.
    pub fn data(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Redraw generation; increments whenever data or options change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check whether markers are shown.
    pub fn is_visible(&self) -> bool {
        self.opts.symbol.is_some()
    }

    pub(crate) fn update_opts(&mut self, f: impl FnOnce(&mut ScatterOptions)) {
        f(&mut self.opts);
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn set_data(&mut self, x: Vec<f64>, y: Vec<f64>) {
        self.x = x;
        self.y = y;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Append the commands that draw the markers.
    pub fn render(&self, transform: &Transform, clip: ScreenRect, out: &mut RenderList) {
        let Some(symbol) = self.opts.symbol else {
            return;
        };
        let mut points = Vec::new();
        build_scatter_points(&self.x, &self.y, transform, clip, &mut points);
        if points.is_empty() {
            return;
        }
        out.push(RenderCommand::Markers {
            points,
            symbol,
            size: self.opts.size,
            pen: self.opts.pen,
            brush: self.opts.brush,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Range, Viewport};

    #[test]
    fn markers_need_a_symbol() {
        let mut scatter = ScatterItem::default();
        scatter.set_data(vec![0.5], vec![0.5]);
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let rect = ScreenRect::from_size(10.0, 10.0);
        let transform = Transform::new(viewport, rect).unwrap();

        let mut list = RenderList::new();
        scatter.render(&transform, rect, &mut list);
        assert!(list.commands().is_empty());

        scatter.update_opts(|opts| opts.symbol = Some(Symbol::Triangle));
        scatter.render(&transform, rect, &mut list);
        assert!(matches!(
            list.commands(),
            [RenderCommand::Markers {
                symbol: Symbol::Triangle,
                ..
            }]
        ));
    }
}
