//! GPUI integration.
//!
//! [`GpuiPlotView`] paints a [`Plot`](crate::plot::Plot) into a GPUI canvas,
//! keeping the plot's pixel size in sync with the element bounds so that
//! clip-to-view and automatic downsampling see the real plot area.

mod paint;
mod view;

pub use view::{GpuiPlotView, PlotHandle};
