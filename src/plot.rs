//! The containing view: a set of data items sharing one viewport.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datasource::downsample::DownsampleMethod;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::item::{Axis, PlotDataItem};
use crate::render::{RenderCommand, RenderList};
use crate::transform::Transform;
use crate::view::{Range, View, ViewContext, Viewport};

/// Configuration of a [`Plot`]: range fitting and the processing it pushes
/// into its items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotViewConfig {
    /// Padding added on both sides of auto-fitted and explicit ranges, as a
    /// fraction of the span.
    pub padding: f64,
    /// Smallest absolute padding, so flat data still gets a visible range.
    pub min_padding: f64,
    /// Downsampling applied to every item, including ones added later.
    /// `None` leaves each item's own setting alone.
    pub downsampling: Option<PlotDownsampling>,
    /// Clip-to-view applied to every item, including ones added later.
    pub clip_to_view: Option<bool>,
}

impl Default for PlotViewConfig {
    fn default() -> Self {
        Self {
            padding: 0.02,
            min_padding: 1e-9,
            downsampling: None,
            clip_to_view: None,
        }
    }
}

impl PlotViewConfig {
    fn apply_to(&self, item: &mut PlotDataItem) {
        if let Some(ds) = self.downsampling {
            item.set_downsampling(Some(ds.factor), Some(ds.auto), Some(ds.method));
        }
        if let Some(clip) = self.clip_to_view {
            item.set_clip_to_view(clip);
        }
    }
}

/// Downsampling settings shared by the items of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotDownsampling {
    /// Fixed factor, used while `auto` is off.
    pub factor: usize,
    /// Pick the factor from the view width.
    pub auto: bool,
    /// Reduction method.
    pub method: DownsampleMethod,
}

impl Default for PlotDownsampling {
    fn default() -> Self {
        Self {
            factor: 1,
            auto: false,
            method: DownsampleMethod::Peak,
        }
    }
}

/// Main plot container.
#[derive(Debug, Clone)]
pub struct Plot {
    config: PlotViewConfig,
    view: View,
    viewport: Option<Viewport>,
    size: (f32, f32),
    items: Vec<PlotDataItem>,
}

impl Plot {
    /// Create a plot with default configuration.
    pub fn new() -> Self {
        Self {
            config: PlotViewConfig::default(),
            view: View::default(),
            viewport: None,
            size: (640.0, 480.0),
            items: Vec::new(),
        }
    }

    /// Start building a plot with custom configuration.
    pub fn builder() -> PlotBuilder {
        PlotBuilder::default()
    }

    /// Access the range fitting configuration.
    pub fn config(&self) -> &PlotViewConfig {
        &self.config
    }

    /// Access the active view mode.
    pub fn view(&self) -> View {
        self.view
    }

    /// Access the current viewport.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Plot area size in pixels.
    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    /// Access all items.
    pub fn items(&self) -> &[PlotDataItem] {
        &self.items
    }

    /// Access one item mutably.
    ///
    /// Call [`Plot::refresh`] afterwards if the change affects the data range.
    pub fn item_mut(&mut self, index: usize) -> Option<&mut PlotDataItem> {
        self.items.get_mut(index)
    }

    /// Add an item and return its index.
    ///
    /// Plot-wide downsampling and clip-to-view settings are applied to it.
    pub fn add_item(&mut self, mut item: PlotDataItem) -> usize {
        self.config.apply_to(&mut item);
        item.view_changed(self.view_context());
        self.items.push(item);
        self.refresh();
        self.items.len() - 1
    }

    /// Remove and return an item.
    pub fn remove_item(&mut self, index: usize) -> Option<PlotDataItem> {
        if index >= self.items.len() {
            return None;
        }
        let mut item = self.items.remove(index);
        item.view_changed(None);
        self.refresh();
        Some(item)
    }

    /// Compute bounds across all items.
    pub fn data_bounds(&self) -> Option<Viewport> {
        let mut x_range: Option<Range> = None;
        let mut y_range: Option<Range> = None;
        for item in &self.items {
            let (Some(x), Some(y)) = (
                item.data_bounds(Axis::X, 1.0, None),
                item.data_bounds(Axis::Y, 1.0, None),
            ) else {
                continue;
            };
            let (x, y) = (Range::new(x.0, x.1), Range::new(y.0, y.1));
            x_range = Some(match x_range {
                None => x,
                Some(existing) => Range::union(existing, x)?,
            });
            y_range = Some(match y_range {
                None => y,
                Some(existing) => Range::union(existing, y)?,
            });
        }
        match (x_range, y_range) {
            (Some(x), Some(y)) => Some(Viewport::new(x, y)),
            _ => None,
        }
    }

    /// Show `min..max` on X and stop auto-fitting X.
    ///
    /// `padding` is a fraction of the span; `None` uses the configured one.
    pub fn set_x_range(&mut self, min: f64, max: f64, padding: Option<f64>) {
        let range = self.padded(Range::new(min, max), padding);
        self.view = match self.view {
            View::AutoAll { auto_y: true, .. } => View::AutoAll {
                auto_x: false,
                auto_y: true,
            },
            _ => View::Manual,
        };
        let y = self.current_or_fitted(|viewport| viewport.y);
        self.viewport = Some(Viewport::new(range, y));
        self.refresh();
    }

    /// Show `min..max` on Y and stop auto-fitting Y.
    pub fn set_y_range(&mut self, min: f64, max: f64, padding: Option<f64>) {
        let range = self.padded(Range::new(min, max), padding);
        self.view = match self.view {
            View::AutoAll { auto_x: true, .. } => View::AutoAll {
                auto_x: true,
                auto_y: false,
            },
            _ => View::Manual,
        };
        let x = self.current_or_fitted(|viewport| viewport.x);
        self.viewport = Some(Viewport::new(x, range));
        self.refresh();
    }

    /// Resize the plot area.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
        self.notify_items();
    }

    /// Fit both axes to the data again.
    pub fn auto_range(&mut self) {
        self.view = View::default();
        self.refresh();
    }

    /// Configure downsampling on every current and future item.
    ///
    /// `None` keeps the plot's previous value for that setting.
    pub fn set_downsampling(
        &mut self,
        ds: Option<usize>,
        auto: Option<bool>,
        method: Option<DownsampleMethod>,
    ) {
        let current = self.config.downsampling.unwrap_or_default();
        self.config.downsampling = Some(PlotDownsampling {
            factor: ds.unwrap_or(current.factor),
            auto: auto.unwrap_or(current.auto),
            method: method.unwrap_or(current.method),
        });
        self.apply_config();
    }

    /// Toggle clip-to-view on every current and future item.
    pub fn set_clip_to_view(&mut self, clip: bool) {
        self.config.clip_to_view = Some(clip);
        self.apply_config();
    }

    fn apply_config(&mut self) {
        for item in &mut self.items {
            self.config.apply_to(item);
        }
    }

    /// Refit auto axes to the data and pass the view on to every item.
    pub fn refresh(&mut self) -> Option<Viewport> {
        if let View::AutoAll { auto_x, auto_y } = self.view
            && let Some(bounds) = self.data_bounds()
        {
            let mut next = bounds.padded(self.config.padding, self.config.min_padding);
            if let Some(current) = self.viewport {
                if !auto_x {
                    next.x = current.x;
                }
                if !auto_y {
                    next.y = current.y;
                }
            }
            if self.viewport != Some(next) {
                debug!(
                    x_min = next.x.min,
                    x_max = next.x.max,
                    y_min = next.y.min,
                    y_max = next.y.max,
                    "auto range"
                );
            }
            self.viewport = Some(next);
        }
        self.notify_items();
        self.viewport
    }

    /// Append render commands for every item, clipped to the plot area whose
    /// top-left corner sits at `origin`.
    pub fn render(&self, origin: ScreenPoint, out: &mut RenderList) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let rect = ScreenRect::new(
            origin,
            ScreenPoint::new(origin.x + self.size.0, origin.y + self.size.1),
        );
        let Some(transform) = Transform::new(viewport, rect) else {
            return;
        };
        out.push(RenderCommand::ClipRect(rect));
        for item in &self.items {
            item.render(&transform, rect, out);
        }
        out.push(RenderCommand::ClipEnd);
    }

    fn padded(&self, range: Range, padding: Option<f64>) -> Range {
        range.padded(padding.unwrap_or(self.config.padding), 0.0)
    }

    fn current_or_fitted(&self, axis: impl Fn(&Viewport) -> Range) -> Range {
        self.viewport
            .or_else(|| {
                self.data_bounds()
                    .map(|bounds| bounds.padded(self.config.padding, self.config.min_padding))
            })
            .map_or(Range::new(0.0, 1.0), |viewport| axis(&viewport))
    }

    fn view_context(&self) -> Option<ViewContext> {
        let viewport = self.viewport?;
        Some(ViewContext {
            viewport,
            pixel_size: self.size,
            auto_range_x: matches!(self.view, View::AutoAll { auto_x: true, .. }),
        })
    }

    fn notify_items(&mut self) {
        let context = self.view_context();
        for item in &mut self.items {
            item.view_changed(context);
        }
    }
}

impl Default for Plot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a plot before construction.
#[derive(Debug, Default)]
pub struct PlotBuilder {
    config: PlotViewConfig,
    view: View,
    size: Option<(f32, f32)>,
    items: Vec<PlotDataItem>,
}

impl PlotBuilder {
    /// Set the range fitting configuration.
    pub fn config(mut self, config: PlotViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial view mode.
    pub fn view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    /// Set the plot area size in pixels.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Add an item to the plot.
    pub fn item(mut self, item: PlotDataItem) -> Self {
        self.items.push(item);
        self
    }

    /// Build the plot.
    pub fn build(self) -> Plot {
        let mut plot = Plot {
            config: self.config,
            view: self.view,
            viewport: None,
            size: self.size.unwrap_or((640.0, 480.0)),
            items: self.items,
        };
        plot.apply_config();
        plot.refresh();
        plot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> PlotDataItem {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        PlotDataItem::with_data((x.clone(), x)).unwrap()
    }

    #[test]
    fn auto_range_fits_items_with_padding() {
        let mut plot = Plot::new();
        plot.add_item(ramp(101));
        let viewport = plot.viewport().unwrap();
        assert!((viewport.x.min + 2.0).abs() < 1e-9);
        assert!((viewport.x.max - 102.0).abs() < 1e-9);
    }

    #[test]
    fn set_x_range_disables_auto_x_only() {
        let mut plot = Plot::new();
        plot.add_item(ramp(101));
        plot.set_x_range(10.0, 20.0, Some(0.0));
        assert_eq!(
            plot.view(),
            View::AutoAll {
                auto_x: false,
                auto_y: true
            }
        );
        let viewport = plot.viewport().unwrap();
        assert_eq!(viewport.x, Range::new(10.0, 20.0));
        plot.set_y_range(0.0, 1.0, Some(0.0));
        assert_eq!(plot.view(), View::Manual);
        plot.auto_range();
        assert_eq!(plot.view(), View::default());
    }

    #[test]
    fn clip_to_view_reaches_items() {
        let mut plot = Plot::new();
        plot.add_item(ramp(1000));
        plot.set_clip_to_view(true);
        assert_eq!(plot.items()[0].get_data().0.len(), 1000);
        plot.set_x_range(100.0, 200.0, Some(0.0));
        let shown = plot.items()[0].get_data().0.len();
        assert_eq!(shown, 102);
    }

    #[test]
    fn downsampling_reaches_items() {
        let mut plot = Plot::new();
        plot.add_item(ramp(1000));
        plot.set_downsampling(Some(10), None, Some(DownsampleMethod::Mean));
        assert_eq!(plot.items()[0].display_dataset().downsample, 10);
        assert_eq!(plot.items()[0].get_data().0.len(), 100);
    }

    #[test]
    fn settings_reach_items_added_later() {
        let mut plot = Plot::new();
        plot.set_clip_to_view(true);
        plot.set_downsampling(Some(5), None, Some(DownsampleMethod::Mean));
        plot.set_x_range(100.0, 200.0, Some(0.0));
        let index = plot.add_item(ramp(1000));
        let item = &plot.items()[index];
        assert!(item.options().clip_to_view);
        assert_eq!(item.options().downsample, 5);
        assert_eq!(item.options().downsample_method, DownsampleMethod::Mean);
        assert_eq!(item.get_data().0.len(), 22);
    }

    #[test]
    fn unconfigured_plot_keeps_item_settings() {
        let mut item = ramp(100);
        item.set_downsampling(Some(4), None, Some(DownsampleMethod::Subsample));
        let plot = Plot::builder().item(item).build();
        assert_eq!(plot.items()[0].options().downsample, 4);

        let config = PlotViewConfig {
            clip_to_view: Some(true),
            ..PlotViewConfig::default()
        };
        let plot = Plot::builder().config(config).item(ramp(100)).build();
        assert!(plot.items()[0].options().clip_to_view);
    }

    #[test]
    fn item_mut_then_refresh_refits() {
        let mut plot = Plot::new();
        let index = plot.add_item(ramp(10));
        plot.item_mut(index)
            .unwrap()
            .set_data(vec![0.0, 500.0])
            .unwrap();
        let viewport = plot.refresh().unwrap();
        assert!(viewport.y.max > 500.0);
        assert!(plot.remove_item(index).is_some());
        assert!(plot.items().is_empty());
    }

    #[test]
    fn render_wraps_items_in_clip() {
        let plot = Plot::builder().size(200.0, 100.0).item(ramp(5)).build();
        let mut list = RenderList::new();
        plot.render(ScreenPoint::new(0.0, 0.0), &mut list);
        let commands = list.commands();
        assert!(matches!(commands.first(), Some(RenderCommand::ClipRect(_))));
        assert!(matches!(commands.last(), Some(RenderCommand::ClipEnd)));
        assert!(commands.len() > 2);
    }
}
