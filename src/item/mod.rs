//! The plot data item: raw data in, display dataset out.
//!
//! A [`PlotDataItem`] stores raw x/y columns and turns them into the series
//! its two child renderers draw: a [`CurveItem`] for the line and a
//! [`ScatterItem`] for the markers. The pipeline is
//!
//! 1. mapping (spectrum, derivative, phase map, mean removal, log) over the
//!    full raw data, cached per data and mapping generation;
//! 2. clip-to-view, downsampling and dynamic range limiting, cached per data,
//!    option and view state.
//!
//! Every mutation refreshes the caches before returning, so a read never sees
//! a display dataset that is older than the data or options it came from.

mod cache;
mod curve;
mod scatter;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::datasource::clip::{VisibleSpan, limit_dynamic_range, visible_span};
use crate::datasource::downsample::{DownsampleMethod, auto_factor, downsample};
use crate::datasource::{
    Column, Connect, DataInput, InputShapeError, StepMode, finite_bounds,
};
use crate::geom::ScreenRect;
use crate::mapping::{MappedData, MappingOptions, map_series};
use crate::render::RenderList;
use crate::style::{Brush, Pen, Symbol};
use crate::transform::Transform;
use crate::view::{Range, ViewContext};

use cache::{DisplayKey, MappedKey, Stamped};

pub use cache::DisplayDataset;
pub use curve::{CurveItem, CurveOptions};
pub use scatter::{ScatterItem, ScatterOptions};

/// Plot axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Data handling options of a [`PlotDataItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOptions {
    /// Display transforms.
    pub mapping: MappingOptions,
    /// Fixed downsampling factor; 1 disables downsampling.
    pub downsample: usize,
    /// Derive the factor from the view width instead.
    pub auto_downsample: bool,
    /// Pixels per output point before automatic downsampling kicks in.
    pub auto_downsample_factor: f64,
    /// Reduction method.
    pub downsample_method: DownsampleMethod,
    /// Only hand the visible part of the data to the renderers.
    pub clip_to_view: bool,
    /// Clamp Y to this many view heights beyond the view; `None` disables.
    pub dynamic_range_limit: Option<f64>,
    /// Hysteresis applied before the dynamic range limit engages.
    pub dynamic_range_hysteresis: f64,
    /// Point connectivity.
    pub connect: Connect,
    /// Step rendering mode.
    pub step_mode: StepMode,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            mapping: MappingOptions::default(),
            downsample: 1,
            auto_downsample: false,
            auto_downsample_factor: 5.0,
            downsample_method: DownsampleMethod::Peak,
            clip_to_view: false,
            dynamic_range_limit: Some(1e6),
            dynamic_range_hysteresis: 3.0,
            connect: Connect::All,
            step_mode: StepMode::None,
        }
    }
}

/// A plottable series with display transforms and two child renderers.
#[derive(Debug, Clone)]
pub struct PlotDataItem {
    name: Option<String>,
    data: Option<(Column, Column)>,
    options: ItemOptions,
    view: Option<ViewContext>,
    data_generation: u64,
    mapping_generation: u64,
    options_generation: u64,
    mapped: Stamped<MappedKey, MappedData>,
    display: Stamped<DisplayKey, DisplayDataset>,
    curve: CurveItem,
    scatter: ScatterItem,
}

impl Default for PlotDataItem {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotDataItem {
    /// Create an empty item with default options.
    pub fn new() -> Self {
        Self::with_options(ItemOptions::default())
    }

    /// Create an empty item with the given options.
    pub fn with_options(options: ItemOptions) -> Self {
        let mut curve = CurveItem::default();
        curve.update_opts(|opts| opts.step_mode = options.step_mode);
        let mut item = Self {
            name: None,
            data: None,
            options,
            view: None,
            data_generation: 0,
            mapping_generation: 0,
            options_generation: 0,
            mapped: Stamped::default(),
            display: Stamped::default(),
            curve,
            scatter: ScatterItem::default(),
        };
        item.refresh();
        item
    }

    /// Create an item holding `input`.
    pub fn with_data(input: impl Into<DataInput>) -> Result<Self, InputShapeError> {
        let mut item = Self::new();
        item.set_data(input)?;
        Ok(item)
    }

    /// Attach a legend name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Legend name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Access the data options.
    pub fn options(&self) -> &ItemOptions {
        &self.options
    }

    /// Replace the data, keeping the current connectivity if it still fits.
    ///
    /// Zero-length input clears the item. On error nothing changes.
    pub fn set_data(&mut self, input: impl Into<DataInput>) -> Result<(), InputShapeError> {
        let data = input.into().normalize(self.options.step_mode).inspect_err(|err| {
            debug!(%err, "rejected plot data");
        })?;
        if let Some(values) = self.options.connect.as_array()
            && data.as_ref().is_some_and(|(x, _)| x.len() != values.len())
        {
            debug!(
                connect_len = values.len(),
                "dropping connect vector that no longer matches the data"
            );
            self.options.connect = Connect::All;
        }
        self.replace_data(data);
        Ok(())
    }

    /// Replace the data together with its connectivity.
    pub fn set_data_with(
        &mut self,
        input: impl Into<DataInput>,
        connect: impl Into<Connect>,
    ) -> Result<(), InputShapeError> {
        let data = input.into().normalize(self.options.step_mode)?;
        let connect = connect.into();
        if let (Some(values), Some((x, _))) = (connect.as_array(), data.as_ref())
            && values.len() != x.len()
        {
            return Err(InputShapeError::ConnectLength {
                expected: x.len(),
                found: values.len(),
            });
        }
        self.options.connect = connect;
        self.replace_data(data);
        Ok(())
    }

    fn replace_data(&mut self, data: Option<(Column, Column)>) {
        debug!(
            points = data.as_ref().map_or(0, |(_, y)| y.len()),
            name = self.name.as_deref().unwrap_or(""),
            "set plot data"
        );
        self.data = data;
        self.data_generation = self.data_generation.wrapping_add(1);
        self.refresh();
    }

    /// Remove all data.
    pub fn clear(&mut self) {
        self.replace_data(None);
    }

    /// Raw X column, or `None` when cleared.
    pub fn x_data(&self) -> Option<&Column> {
        self.data.as_ref().map(|(x, _)| x)
    }

    /// Raw Y column, or `None` when cleared.
    pub fn y_data(&self) -> Option<&Column> {
        self.data.as_ref().map(|(_, y)| y)
    }

    /// The displayed coordinates.
    pub fn get_data(&self) -> (&[f64], &[f64]) {
        let display = self.display.value();
        (&display.x, &display.y)
    }

    /// The full display dataset.
    pub fn display_dataset(&self) -> &DisplayDataset {
        self.display.value()
    }

    /// The line renderer.
    pub fn curve(&self) -> &CurveItem {
        &self.curve
    }

    /// The marker renderer.
    pub fn scatter(&self) -> &ScatterItem {
        &self.scatter
    }

    /// Show `log10` of either axis.
    pub fn set_log_mode(&mut self, x: bool, y: bool) {
        self.update_mapping(|mapping| {
            mapping.log_x = x;
            mapping.log_y = y;
        });
    }

    /// Show the magnitude spectrum.
    pub fn set_fft_mode(&mut self, enabled: bool) {
        self.update_mapping(|mapping| mapping.fft = enabled);
    }

    /// Show `dy/dx` against x.
    pub fn set_derivative_mode(&mut self, enabled: bool) {
        self.update_mapping(|mapping| mapping.derivative = enabled);
    }

    /// Show `dy/dx` against y.
    pub fn set_phasemap_mode(&mut self, enabled: bool) {
        self.update_mapping(|mapping| mapping.phasemap = enabled);
    }

    /// Subtract the mean of y.
    pub fn set_subtract_mean_mode(&mut self, enabled: bool) {
        self.update_mapping(|mapping| mapping.subtract_mean = enabled);
    }

    fn update_mapping(&mut self, f: impl FnOnce(&mut MappingOptions)) {
        let before = self.options.mapping;
        f(&mut self.options.mapping);
        if self.options.mapping == before {
            return;
        }
        self.mapping_generation = self.mapping_generation.wrapping_add(1);
        self.options_changed();
    }

    /// Configure downsampling. `None` leaves a setting unchanged.
    ///
    /// A factor of 1 disables fixed downsampling.
    pub fn set_downsampling(
        &mut self,
        ds: Option<usize>,
        auto: Option<bool>,
        method: Option<DownsampleMethod>,
    ) {
        if let Some(ds) = ds {
            self.options.downsample = ds.max(1);
        }
        if let Some(auto) = auto {
            self.options.auto_downsample = auto;
        }
        if let Some(method) = method {
            self.options.downsample_method = method;
        }
        self.options_changed();
    }

    /// Only display the part of the data inside the view.
    pub fn set_clip_to_view(&mut self, clip: bool) {
        if self.options.clip_to_view != clip {
            self.options.clip_to_view = clip;
            self.options_changed();
        }
    }

    /// Limit how far Y may extend beyond the view, in view heights.
    pub fn set_dynamic_range_limit(&mut self, limit: Option<f64>, hysteresis: f64) {
        self.options.dynamic_range_limit = limit;
        self.options.dynamic_range_hysteresis = hysteresis;
        self.options_changed();
    }

    /// Replace the point connectivity.
    pub fn set_connect(&mut self, connect: impl Into<Connect>) -> Result<(), InputShapeError> {
        let connect = connect.into();
        if let (Some(values), Some(x)) = (connect.as_array(), self.x_data())
            && values.len() != x.len()
        {
            return Err(InputShapeError::ConnectLength {
                expected: x.len(),
                found: values.len(),
            });
        }
        self.options.connect = connect;
        self.mapping_generation = self.mapping_generation.wrapping_add(1);
        self.options_changed();
        Ok(())
    }

    /// Change the step mode. Fails if the current data does not fit it.
    pub fn set_step_mode(&mut self, mode: StepMode) -> Result<(), InputShapeError> {
        if let Some((x, y)) = &self.data {
            let fits = match mode {
                StepMode::Center => x.len() == y.len() + 1,
                _ => x.len() == y.len(),
            };
            if !fits {
                return Err(if mode == StepMode::Center {
                    InputShapeError::StepLength {
                        x: x.len(),
                        y: y.len(),
                    }
                } else {
                    InputShapeError::LengthMismatch {
                        x: x.len(),
                        y: y.len(),
                    }
                });
            }
        }
        self.options.step_mode = mode;
        self.curve.update_opts(|opts| opts.step_mode = mode);
        self.mapping_generation = self.mapping_generation.wrapping_add(1);
        self.options_changed();
        Ok(())
    }

    /// Tell the item about the view it is shown in.
    pub fn view_changed(&mut self, view: Option<ViewContext>) {
        if self.view != view {
            self.view = view;
            self.refresh();
        }
    }

    fn options_changed(&mut self) {
        self.options_generation = self.options_generation.wrapping_add(1);
        self.refresh();
    }

    /// Recompute whatever is stale and push the result to the renderers.
    fn refresh(&mut self) {
        let mapped_key = MappedKey {
            data_generation: self.data_generation,
            mapping_generation: self.mapping_generation,
        };
        if !self.mapped.is_current(&mapped_key) {
            let mapped = match &self.data {
                None => MappedData::default(),
                Some((x, y)) => map_series(
                    x.to_f64(),
                    y.to_f64(),
                    self.options.connect.as_array().map(<[bool]>::to_vec),
                    self.options.mapping,
                    self.options.step_mode != StepMode::Center,
                ),
            };
            trace!(points = mapped.y.len(), "mapped plot data");
            self.mapped.store(mapped_key, mapped);
            self.display.invalidate();
        }

        let display_key = DisplayKey {
            data_generation: self.data_generation,
            options_generation: self.options_generation,
            view: self.view,
        };
        if self.display.is_current(&display_key) {
            return;
        }
        let dataset = compute_display(self.mapped.value(), &self.options, self.view.as_ref());
        let (points, factor) = (dataset.len(), dataset.downsample);
        trace!(points, downsample = factor, "recomputed display dataset");

        let connect = match (&dataset.connect, &self.options.connect) {
            (Some(values), _) => Connect::Array(values.clone()),
            (None, Connect::Array(_)) => Connect::All,
            (None, other) => other.clone(),
        };
        self.curve.set_data(dataset.x.clone(), dataset.y.clone(), connect);
        if self.scatter.is_visible() {
            self.scatter.set_data(dataset.x.clone(), dataset.y.clone());
        } else {
            self.scatter.set_data(Vec::new(), Vec::new());
        }
        self.display.store(display_key, dataset);
    }

    /// Range of the mapped data along `axis`.
    ///
    /// Non-finite values are ignored. `frac < 1` trims the range to the
    /// central `frac` share of the values; `ortho_range` keeps only points
    /// whose other coordinate lies inside it.
    pub fn data_bounds(
        &self,
        axis: Axis,
        frac: f64,
        ortho_range: Option<Range>,
    ) -> Option<(f64, f64)> {
        let mapped = self.mapped.value();
        let (values, ortho) = match axis {
            Axis::X => (&mapped.x, &mapped.y),
            Axis::Y => (&mapped.y, &mapped.x),
        };
        let selected = values
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                ortho_range.is_none_or(|range| ortho.get(*i).is_some_and(|o| range.contains(*o)))
            })
            .map(|(_, v)| *v);
        if frac >= 1.0 {
            return finite_bounds(selected);
        }
        let mut finite: Vec<f64> = selected.filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);
        let frac = frac.max(0.0);
        Some((
            percentile(&finite, 50.0 * (1.0 - frac)),
            percentile(&finite, 50.0 * (1.0 + frac)),
        ))
    }

    /// Set the line pen; `None` hides the line.
    pub fn set_pen(&mut self, pen: impl Into<Option<Pen>>) {
        let pen = pen.into();
        self.curve.update_opts(|opts| opts.pen = pen);
    }

    /// Set the pen drawn underneath the line.
    pub fn set_shadow_pen(&mut self, pen: impl Into<Option<Pen>>) {
        let pen = pen.into();
        self.curve.update_opts(|opts| opts.shadow_pen = pen);
    }

    /// Fill between the curve and this Y level.
    pub fn set_fill_level(&mut self, level: impl Into<Option<f64>>) {
        let level = level.into();
        self.curve.update_opts(|opts| opts.fill_level = level);
    }

    /// Brush used for the fill.
    pub fn set_fill_brush(&mut self, brush: impl Into<Option<Brush>>) {
        let brush = brush.into();
        self.curve.update_opts(|opts| opts.fill_brush = brush);
    }

    /// Set the marker symbol; `None` hides markers.
    pub fn set_symbol(&mut self, symbol: impl Into<Option<Symbol>>) {
        let symbol = symbol.into();
        let was_visible = self.scatter.is_visible();
        self.scatter.update_opts(|opts| opts.symbol = symbol);
        if self.scatter.is_visible() != was_visible {
            let (x, y) = if symbol.is_some() {
                let display = self.display.value();
                (display.x.clone(), display.y.clone())
            } else {
                (Vec::new(), Vec::new())
            };
            self.scatter.set_data(x, y);
        }
    }

    /// Set the marker outline.
    pub fn set_symbol_pen(&mut self, pen: impl Into<Option<Pen>>) {
        let pen = pen.into();
        self.scatter.update_opts(|opts| opts.pen = pen);
    }

    /// Set the marker fill.
    pub fn set_symbol_brush(&mut self, brush: impl Into<Option<Brush>>) {
        let brush = brush.into();
        self.scatter.update_opts(|opts| opts.brush = brush);
    }

    /// Set the marker size in pixels.
    pub fn set_symbol_size(&mut self, size: f32) {
        self.scatter.update_opts(|opts| opts.size = size);
    }

    /// Append render commands for the curve and markers.
    pub fn render(&self, transform: &Transform, clip: ScreenRect, out: &mut RenderList) {
        self.curve.render(transform, clip, out);
        self.scatter.render(transform, clip, out);
    }
}

/// Clip, downsample and range-limit a mapped series for display.
fn compute_display(
    mapped: &MappedData,
    options: &ItemOptions,
    view: Option<&ViewContext>,
) -> DisplayDataset {
    if options.step_mode == StepMode::Center {
        return DisplayDataset {
            x: mapped.x.clone(),
            y: mapped.y.clone(),
            connect: None,
            downsample: 1,
        };
    }

    let mut ds = options.downsample.max(1);
    if options.auto_downsample
        && let Some(view) = view
    {
        ds = auto_factor(
            &mapped.x,
            view.viewport.x.span(),
            view.pixel_size.0,
            options.auto_downsample_factor,
        );
    }

    let len = mapped.x.len().min(mapped.y.len());
    let mut span = VisibleSpan::whole(len);
    if options.clip_to_view
        && let Some(view) = view
        && !view.auto_range_x
    {
        span = visible_span(&mapped.x[..len], view.viewport.x);
    }

    let connect = mapped.connect.as_deref();
    let inside = span.inside.clone();
    let mut reduced = downsample(
        &mapped.x[inside.clone()],
        &mapped.y[inside.clone()],
        connect.map(|values| &values[inside.start.min(values.len())..inside.end.min(values.len())]),
        ds,
        options.downsample_method,
    );
    // The neighbors outside the view stay raw, so only the first and last
    // shown points can lie off-screen.
    let joined = |i: usize| connect.and_then(|values| values.get(i)).is_none_or(|j| *j);
    if let Some(i) = span.before {
        reduced.push_front(mapped.x[i], mapped.y[i], joined(i));
    }
    if let Some(i) = span.after {
        reduced.push_back(mapped.x[i], mapped.y[i], joined(i));
    }
    let mut y = reduced.y;

    if let (Some(limit), Some(view)) = (options.dynamic_range_limit, view)
        && let Some((min, max)) = finite_bounds(mapped.y.iter().copied())
    {
        limit_dynamic_range(
            &mut y,
            Range::new(min, max),
            view.viewport.y,
            limit,
            options.dynamic_range_hysteresis,
        );
    }

    DisplayDataset {
        x: reduced.x,
        y,
        connect: reduced.connect,
        downsample: ds,
    }
}

/// Linear-interpolated percentile of sorted values, `pct` in 0..=100.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
