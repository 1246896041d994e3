//! gpui_plotdata turns raw x/y data into what a plot actually draws.
//!
//! A [`PlotDataItem`] accepts data in several shapes, applies display
//! transforms (log, spectrum, derivative, phase map, mean removal), clips to
//! the visible range, downsamples to the pixel budget and forwards the result
//! to a line and a marker renderer. The optional `gpui` feature paints a
//! [`Plot`] of such items into a GPUI view.

#![forbid(unsafe_code)]

pub mod datasource;
pub mod geom;
#[cfg(feature = "gpui")]
pub mod gpui_backend;
pub mod item;
pub mod mapping;
pub mod plot;
pub mod render;
pub mod style;
pub mod transform;
pub mod view;

pub use datasource::downsample::DownsampleMethod;
pub use datasource::{Column, Connect, DType, DataInput, InputShapeError, RecordArray, StepMode};
pub use geom::{Point, ScreenPoint, ScreenRect};
pub use item::{
    Axis, CurveItem, CurveOptions, DisplayDataset, ItemOptions, PlotDataItem, ScatterItem,
    ScatterOptions,
};
pub use mapping::MappingOptions;
pub use plot::{Plot, PlotBuilder, PlotDownsampling, PlotViewConfig};
pub use render::{Color, LineSegment, RenderCommand, RenderList};
pub use style::{Brush, Pen, PenStyle, Symbol, UnknownSymbol};
pub use transform::Transform;
pub use view::{Range, View, ViewContext, Viewport};
