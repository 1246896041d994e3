use std::sync::{Arc, PoisonError, RwLock};

use gpui::prelude::*;
use gpui::{Window, canvas, div};

use crate::geom::ScreenPoint;
use crate::plot::Plot;
use crate::render::{Color, RenderList};

use super::paint::{paint_list, to_hsla};

/// A GPUI view that renders a [`Plot`].
#[derive(Clone)]
pub struct GpuiPlotView {
    plot: Arc<RwLock<Plot>>,
    background: Color,
}

impl GpuiPlotView {
    /// Create a new GPUI view for the given plot on a black background.
    pub fn new(plot: Plot) -> Self {
        Self {
            plot: Arc::new(RwLock::new(plot)),
            background: Color::BLACK,
        }
    }

    /// Replace the background color.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Get a handle for mutating the underlying plot.
    ///
    /// This is useful for streaming updates from async tasks.
    pub fn plot_handle(&self) -> PlotHandle {
        PlotHandle {
            plot: Arc::clone(&self.plot),
        }
    }
}

impl Render for GpuiPlotView {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        let plot = Arc::clone(&self.plot);

        div().size_full().bg(to_hsla(self.background)).child(
            canvas(
                move |bounds, _, _| {
                    let mut plot = plot.write().unwrap_or_else(PoisonError::into_inner);
                    let size = (f32::from(bounds.size.width), f32::from(bounds.size.height));
                    if plot.size() != size {
                        plot.set_size(size.0, size.1);
                    }
                    let mut list = RenderList::new();
                    let origin =
                        ScreenPoint::new(f32::from(bounds.origin.x), f32::from(bounds.origin.y));
                    plot.render(origin, &mut list);
                    list
                },
                move |_, list, window, _| {
                    paint_list(&list, window);
                },
            )
            .size_full(),
        )
    }
}

/// A handle for mutating a [`Plot`] held inside a [`GpuiPlotView`].
///
/// The handle clones cheaply and can be moved into async tasks.
#[derive(Clone)]
pub struct PlotHandle {
    plot: Arc<RwLock<Plot>>,
}

impl PlotHandle {
    /// Read the plot state.
    ///
    /// The plot is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&Plot) -> R) -> R {
        let plot = self.plot.read().unwrap_or_else(PoisonError::into_inner);
        f(&plot)
    }

    /// Mutate the plot state.
    ///
    /// The plot is locked for the duration of the callback and refreshed
    /// afterwards, so data changes reach the viewport.
    pub fn write<R>(&self, f: impl FnOnce(&mut Plot) -> R) -> R {
        let mut plot = self.plot.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut plot);
        plot.refresh();
        result
    }
}
