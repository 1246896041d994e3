//! Magnitude spectrum of a sampled series.

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Relative spacing tolerance below which samples count as uniform.
const UNIFORM_TOLERANCE: f64 = 1e-3;

/// Replace `(x, y)` with `(frequency, |Y| / n)` over the one-sided spectrum.
///
/// Non-uniform X is first resampled onto an evenly spaced grid between the
/// first and last sample by linear interpolation. The output holds
/// `n / 2 + 1` bins for both even and odd `n`. Input with fewer than two
/// samples, or whose X does not span a finite non-zero width, has no
/// frequency axis and is returned unchanged.
pub fn magnitude_spectrum(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = x.len().min(y.len());
    if n < 2 {
        return (x[..n].to_vec(), y[..n].to_vec());
    }
    let x = &x[..n];
    let first = x[0];
    let last = x[n - 1];
    if !(last - first).is_finite() || last == first {
        return (x.to_vec(), y[..n].to_vec());
    }

    let resampled;
    let y = if is_uniform(x) {
        &y[..n]
    } else {
        resampled = resample_uniform(x, &y[..n]);
        &resampled[..]
    };

    let mut buffer: Vec<Complex<f64>> = y.iter().map(|v| Complex::new(*v, 0.0)).collect();
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let bins = n / 2 + 1;
    let spacing = (last - first) / (n - 1) as f64;
    let scale = 1.0 / n as f64;
    let freq_step = 1.0 / (n as f64 * spacing);
    let freqs = (0..bins).map(|k| k as f64 * freq_step).collect();
    let mags = buffer[..bins].iter().map(|c| c.norm() * scale).collect();
    (freqs, mags)
}

fn is_uniform(x: &[f64]) -> bool {
    let dx0 = x[1] - x[0];
    let tolerance = dx0.abs() * UNIFORM_TOLERANCE;
    x.windows(2).all(|w| ((w[1] - w[0]) - dx0).abs() <= tolerance)
}

/// Linear interpolation of `(x, y)` onto `n` evenly spaced points.
///
/// X must be ascending; queries outside the data clamp to the end values.
fn resample_uniform(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let step = (x[n - 1] - first) / (n - 1) as f64;
    let mut segment = 0;
    (0..n)
        .map(|i| {
            let target = first + step * i as f64;
            while segment + 2 < n && x[segment + 1] < target {
                segment += 1;
            }
            let (x0, x1) = (x[segment], x[segment + 1]);
            let (y0, y1) = (y[segment], y[segment + 1]);
            if target <= x0 {
                y0
            } else if target >= x1 || x1 == x0 {
                y1
            } else {
                y0 + (y1 - y0) * (target - x0) / (x1 - x0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect()
    }

    fn peak_frequency(freqs: &[f64], mags: &[f64]) -> f64 {
        let (index, _) = mags
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, m)| {
                if *m > best.1 { (i, *m) } else { best }
            });
        freqs[index]
    }

    #[test]
    fn finds_dominant_frequency_for_even_and_odd_lengths() {
        for n in [1000, 1001] {
            let x = linspace(0.0, 1.0, n);
            let y: Vec<f64> = x
                .iter()
                .map(|t| (2.0 * std::f64::consts::PI * 20.0 * t).sin())
                .collect();
            let (freqs, mags) = magnitude_spectrum(&x, &y);
            assert_eq!(freqs.len(), n / 2 + 1);
            assert_eq!(mags.len(), freqs.len());
            assert!((peak_frequency(&freqs, &mags) - 20.0).abs() < 0.03, "n = {n}");
        }
    }

    #[test]
    fn constant_signal_is_all_dc() {
        let x = linspace(0.0, 1.0, 8);
        let y = vec![2.0; 8];
        let (freqs, mags) = magnitude_spectrum(&x, &y);
        assert_eq!(freqs[0], 0.0);
        assert!((mags[0] - 2.0).abs() < 1e-12);
        assert!(mags[1..].iter().all(|m| m.abs() < 1e-12));
    }

    #[test]
    fn non_uniform_samples_are_resampled() {
        let x = vec![0.0, 1.0, 3.0, 4.0];
        let y = vec![0.0, 1.0, 3.0, 4.0];
        assert!(!is_uniform(&x));
        let resampled = resample_uniform(&x, &y);
        let expected = [0.0, 4.0 / 3.0, 8.0 / 3.0, 4.0];
        for (got, want) in resampled.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn short_input_is_passed_through() {
        let (freqs, mags) = magnitude_spectrum(&[1.0], &[5.0]);
        assert_eq!(freqs, vec![1.0]);
        assert_eq!(mags, vec![5.0]);
    }

    #[test]
    fn zero_width_x_is_passed_through() {
        let x = vec![3.0; 5];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let (freqs, mags) = magnitude_spectrum(&x, &y);
        assert_eq!(freqs, x);
        assert_eq!(mags, y);
    }
}
