//! Display-only transforms applied to the full raw series.
//!
//! Mapping never touches the stored data; it produces the series that clipping
//! and downsampling then reduce. Transforms run in a fixed order: spectrum,
//! derivative, phase map, mean removal, then logarithms.

mod fft;

use serde::{Deserialize, Serialize};

pub use fft::magnitude_spectrum;

/// Transform toggles for a data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOptions {
    /// Show `log10(x)`.
    pub log_x: bool,
    /// Show `log10(y)`.
    pub log_y: bool,
    /// Show the magnitude spectrum instead of the signal.
    pub fft: bool,
    /// Show `dy/dx` against x.
    pub derivative: bool,
    /// Show `dy/dx` against y.
    pub phasemap: bool,
    /// Subtract the mean of y.
    pub subtract_mean: bool,
}

impl MappingOptions {
    fn needs_pairs(&self) -> bool {
        self.fft || self.derivative || self.phasemap
    }
}

/// A series after mapping, before clipping and downsampling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedData {
    /// Mapped X values.
    pub x: Vec<f64>,
    /// Mapped Y values.
    pub y: Vec<f64>,
    /// Explicit connectivity, when it still lines up with the points.
    pub connect: Option<Vec<bool>>,
}

/// Apply `options` to a raw series.
///
/// `paired` is false for center step mode, where X holds one more value than
/// Y; transforms that combine x and y point-wise are skipped then.
pub fn map_series(
    mut x: Vec<f64>,
    mut y: Vec<f64>,
    mut connect: Option<Vec<bool>>,
    options: MappingOptions,
    paired: bool,
) -> MappedData {
    if paired && options.needs_pairs() {
        if options.fft {
            (x, y) = magnitude_spectrum(&x, &y);
            // Frequency bins no longer correspond to the original points.
            connect = None;
            if options.log_x && !x.is_empty() {
                // Drop the DC bin; its log is undefined.
                x.remove(0);
                y.remove(0);
            }
        }
        if options.derivative {
            y = difference_quotient(&x, &y);
            x.truncate(y.len());
            truncate_connect(&mut connect, y.len());
        }
        if options.phasemap {
            let dy = difference_quotient(&x, &y);
            y.truncate(dy.len());
            x = y;
            y = dy;
            truncate_connect(&mut connect, x.len());
        }
    }
    if options.subtract_mean {
        subtract_mean(&mut y);
    }
    if options.log_x {
        log10_in_place(&mut x);
    }
    if options.log_y {
        log10_in_place(&mut y);
    }
    MappedData { x, y, connect }
}

fn truncate_connect(connect: &mut Option<Vec<bool>>, len: usize) {
    if let Some(values) = connect.as_mut() {
        values.truncate(len);
    }
}

/// `diff(y) / diff(x)`, one element shorter than the input.
fn difference_quotient(x: &[f64], y: &[f64]) -> Vec<f64> {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
        .collect()
}

fn subtract_mean(y: &mut [f64]) {
    let (sum, count) = y
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return;
    }
    let mean = sum / count as f64;
    for value in y.iter_mut() {
        *value -= mean;
    }
}

/// Base-10 logarithm where every non-finite result becomes NaN.
///
/// Zero, negative, NaN and infinite inputs all map to NaN.
pub fn log10_in_place(values: &mut [f64]) {
    for value in values.iter_mut() {
        let mapped = value.log10();
        *value = if mapped.is_finite() { mapped } else { f64::NAN };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(l, r)| l == r || (l.is_nan() && r.is_nan()))
    }

    #[test]
    fn identity_keeps_non_finite_values() {
        let x = vec![f64::NEG_INFINITY, 0.0, 1.0, 2.0, f64::NAN, 4.0, f64::INFINITY];
        let y = vec![1.0, 0.0, -1.0, f64::INFINITY, 2.0, f64::NAN, 0.0];
        let mapped = map_series(x.clone(), y.clone(), None, MappingOptions::default(), true);
        assert!(same(&mapped.x, &x));
        assert!(same(&mapped.y, &y));
    }

    #[test]
    fn log_marks_undefined_values_nan() {
        let x = vec![f64::NEG_INFINITY, 0.0, 1.0, 2.0, f64::NAN, 4.0, f64::INFINITY];
        let y = vec![1.0, 0.0, -1.0, f64::INFINITY, 2.0, f64::NAN, 0.0];
        let options = MappingOptions {
            log_x: true,
            log_y: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(x, y, None, options, true);
        let nan = f64::NAN;
        assert!(same(
            &mapped.x,
            &[nan, nan, 0.0, 2f64.log10(), nan, 4f64.log10(), nan]
        ));
        assert!(same(&mapped.y, &[0.0, nan, nan, nan, 2f64.log10(), nan, nan]));
    }

    #[test]
    fn derivative_and_phasemap() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 1.0, 4.0, 9.0];
        let derivative = MappingOptions {
            derivative: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(x.clone(), y.clone(), Some(vec![true; 4]), derivative, true);
        assert_eq!(mapped.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(mapped.y, vec![1.0, 3.0, 5.0]);
        assert_eq!(mapped.connect, Some(vec![true; 3]));

        let phasemap = MappingOptions {
            phasemap: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(x, y, None, phasemap, true);
        assert_eq!(mapped.x, vec![0.0, 1.0, 4.0]);
        assert_eq!(mapped.y, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn subtract_mean_ignores_non_finite() {
        let options = MappingOptions {
            subtract_mean: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(vec![0.0, 1.0, 2.0], vec![1.0, f64::NAN, 3.0], None, options, true);
        assert_eq!(mapped.y[0], -1.0);
        assert!(mapped.y[1].is_nan());
        assert_eq!(mapped.y[2], 1.0);
    }

    #[test]
    fn unpaired_series_only_gets_log() {
        let options = MappingOptions {
            fft: true,
            log_y: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(vec![0.0, 1.0, 2.0], vec![10.0, 100.0], None, options, false);
        assert_eq!(mapped.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(mapped.y, vec![1.0, 2.0]);
    }

    #[test]
    fn fft_with_log_x_drops_dc() {
        let n = 64;
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let y: Vec<f64> = x.iter().map(|t| (2.0 * std::f64::consts::PI * 4.0 * t).cos()).collect();
        let options = MappingOptions {
            fft: true,
            log_x: true,
            ..MappingOptions::default()
        };
        let mapped = map_series(x, y, Some(vec![true; n]), options, true);
        assert_eq!(mapped.x.len(), n / 2);
        assert!(mapped.x.iter().all(|v| v.is_finite()));
        assert!(mapped.connect.is_none());
    }
}
