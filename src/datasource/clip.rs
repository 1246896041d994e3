//! Clip-to-view and dynamic range limiting.

use crate::view::Range;

use super::lower_bound;

/// Points kept when clipping a series to a visible X range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSpan {
    /// Points whose X lies inside the range.
    pub inside: std::ops::Range<usize>,
    /// The last point before the range, if any.
    pub before: Option<usize>,
    /// The first point past the range, if any.
    pub after: Option<usize>,
}

impl VisibleSpan {
    /// A span keeping all `len` points.
    pub fn whole(len: usize) -> Self {
        Self {
            inside: 0..len,
            before: None,
            after: None,
        }
    }

    /// Number of kept points.
    pub fn len(&self) -> usize {
        self.inside.len() + usize::from(self.before.is_some()) + usize::from(self.after.is_some())
    }

    /// Whether no point is kept.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a series into the points inside a visible X range and the single
/// neighbor on each side that carries the line to the view edge.
///
/// X values are assumed to be ascending. Only the inside part may be
/// downsampled; the neighbors are kept as they are. With a single distinct X
/// value the result is either every point (the window covers it) or exactly
/// one (the window misses it).
pub fn visible_span(x: &[f64], range: Range) -> VisibleSpan {
    let len = x.len();
    if len <= 1 {
        return VisibleSpan::whole(len);
    }
    let start = lower_bound(x, range.min).min(len);
    let end = lower_bound(x, range.max).clamp(start, len);
    VisibleSpan {
        inside: start..end,
        before: start.checked_sub(1),
        after: (end < len).then_some(end),
    }
}

/// Clamp Y values so they stay within `limit` view heights of the view.
///
/// Only kicks in when the data overlaps the view and spans more than
/// `2 * hysteresis * limit` view heights. Returns whether any clamping was
/// applied.
pub fn limit_dynamic_range(
    y: &mut [f64],
    data_y: Range,
    view_y: Range,
    limit: f64,
    hysteresis: f64,
) -> bool {
    let view_height = view_y.span();
    if !(view_height > 0.0) || !data_y.is_finite() {
        return false;
    }
    if data_y.max < view_y.min || data_y.min > view_y.max {
        return false;
    }
    if data_y.span() <= 2.0 * hysteresis * limit * view_height {
        return false;
    }
    let min = view_y.min - limit * view_height;
    let max = view_y.max + limit * view_height;
    for value in y.iter_mut() {
        if value.is_finite() {
            *value = value.clamp(min, max);
        }
    }
    true
}
