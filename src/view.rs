//! Visible ranges and the view state handed to data items.

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether a value lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Union two ranges if both are finite.
    pub fn union(a: Self, b: Self) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        })
    }

    /// Add padding as a fraction of the span on both sides.
    pub fn padded(&self, frac: f64, min_padding: f64) -> Self {
        let span = self.span().abs();
        let padding = (span * frac).max(min_padding);
        Self {
            min: self.min - padding,
            max: self.max + padding,
        }
    }

    /// Ensure the range has at least the given span, keeping its centre.
    pub fn with_min_span(&self, min_span: f64) -> Self {
        let span = self.span();
        if span >= min_span {
            return *self;
        }
        let center = (self.min + self.max) * 0.5;
        let half = min_span * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// How the containing view chooses its visible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Fit the data on the enabled axes (default).
    AutoAll {
        /// Follow the data range on X.
        auto_x: bool,
        /// Follow the data range on Y.
        auto_y: bool,
    },
    /// Keep whatever range was last set.
    Manual,
}

impl Default for View {
    fn default() -> Self {
        Self::AutoAll {
            auto_x: true,
            auto_y: true,
        }
    }
}

/// Visible data ranges on both axes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// X axis range.
    pub x: Range,
    /// Y axis range.
    pub y: Range,
}

impl Viewport {
    /// Create a viewport from X and Y ranges.
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Apply padding to both axes.
    pub fn padded(&self, frac: f64, min_padding: f64) -> Self {
        Self {
            x: self.x.padded(frac, min_padding),
            y: self.y.padded(frac, min_padding),
        }
    }
}

/// What a data item knows about the view that contains it.
///
/// Clipping and automatic downsampling read from this; any change to it
/// invalidates the item's display dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewContext {
    /// Currently visible data ranges.
    pub viewport: Viewport,
    /// Plot area size in pixels (width, height).
    pub pixel_size: (f32, f32),
    /// Whether the view is auto-fitting X to the data.
    ///
    /// Clip-to-view is bypassed while this is set, since the whole data set
    /// is about to become visible anyway.
    pub auto_range_x: bool,
}

impl ViewContext {
    /// Create a context for a fixed (manual) X range.
    pub fn new(viewport: Viewport, pixel_size: (f32, f32)) -> Self {
        Self {
            viewport,
            pixel_size,
            auto_range_x: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_min_span_expands() {
        let range = Range::new(2.0, 2.0);
        let expanded = range.with_min_span(1.0);
        assert!(expanded.span() >= 1.0);
        assert!(((expanded.min + expanded.max) * 0.5 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn range_new_orders_bounds() {
        let range = Range::new(5.0, -1.0);
        assert_eq!(range.min, -1.0);
        assert_eq!(range.max, 5.0);
        assert!(range.contains(0.0));
        assert!(!range.contains(6.0));
    }

    #[test]
    fn union_rejects_non_finite() {
        let a = Range::new(0.0, 1.0);
        assert_eq!(Range::union(a, Range::new(-2.0, 0.5)), Some(Range::new(-2.0, 1.0)));
        assert_eq!(Range::union(a, Range::new(0.0, f64::INFINITY)), None);
    }

    #[test]
    fn view_context_starts_with_manual_x() {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let context = ViewContext::new(viewport, (100.0, 50.0));
        assert!(!context.auto_range_x);
        assert_eq!(View::default(), View::AutoAll { auto_x: true, auto_y: true });
    }
}
