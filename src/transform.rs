//! Mapping between data space and screen space.

use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::view::Viewport;

const MIN_SPAN: f64 = 1e-12;

/// Linear transform from a data viewport onto a screen rectangle.
///
/// Screen Y grows downwards, so the top of the rectangle shows `viewport.y.max`.
/// Log display is applied to the data before it reaches here.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    viewport: Viewport,
    screen: ScreenRect,
}

impl Transform {
    /// Create a transform, or `None` for an empty rectangle or a non-finite viewport.
    pub fn new(viewport: Viewport, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() || !viewport.x.is_finite() || !viewport.y.is_finite() {
            return None;
        }
        let viewport = Viewport::new(
            viewport.x.with_min_span(MIN_SPAN),
            viewport.y.with_min_span(MIN_SPAN),
        );
        Some(Self { viewport, screen })
    }

    /// Access the viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Access the screen rectangle.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data point into screen space. Non-finite points have no position.
    pub fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        let x_norm = (point.x - self.viewport.x.min) / self.viewport.x.span();
        let y_norm = (point.y - self.viewport.y.min) / self.viewport.y.span();
        let sx = self.screen.min.x as f64 + x_norm * self.screen.width() as f64;
        let sy = self.screen.max.y as f64 - y_norm * self.screen.height() as f64;
        Some(ScreenPoint::new(sx as f32, sy as f32))
    }
}
