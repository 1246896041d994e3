//! Display downsampling.
//!
//! Each method reduces a series by an integer factor `ds`. When an explicit
//! connectivity vector accompanies the data it is reduced alongside, so the
//! output always carries one connect entry per output point and a break in
//! the input still shows up as a break between the output points around it.

use serde::{Deserialize, Serialize};

/// Downsampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMethod {
    /// Keep every `ds`-th point.
    Subsample,
    /// Average each bucket of `ds` points.
    Mean,
    /// Keep the maximum and minimum of each bucket of `ds` points.
    #[default]
    Peak,
}

/// A reduced series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reduced {
    /// Output X values.
    pub x: Vec<f64>,
    /// Output Y values.
    pub y: Vec<f64>,
    /// Output connectivity, present when the input had one.
    pub connect: Option<Vec<bool>>,
}

impl Reduced {
    /// Put a point in front; `joined` links it to the current first point.
    pub fn push_front(&mut self, x: f64, y: f64, joined: bool) {
        self.x.insert(0, x);
        self.y.insert(0, y);
        if let Some(connect) = self.connect.as_mut() {
            connect.insert(0, joined);
        }
    }

    /// Append a point; `joined` is its own link to whatever follows.
    pub fn push_back(&mut self, x: f64, y: f64, joined: bool) {
        self.x.push(x);
        self.y.push(y);
        if let Some(connect) = self.connect.as_mut() {
            connect.push(joined);
        }
    }
}

/// Reduce `x`/`y` (and `connect`, if given) by the factor `ds`.
///
/// A factor of 0 or 1 copies the input. A factor larger than the series
/// collapses it into a single bucket.
pub fn downsample(
    x: &[f64],
    y: &[f64],
    connect: Option<&[bool]>,
    ds: usize,
    method: DownsampleMethod,
) -> Reduced {
    let len = x.len().min(y.len());
    let x = &x[..len];
    let y = &y[..len];
    if ds <= 1 || len == 0 {
        return Reduced {
            x: x.to_vec(),
            y: y.to_vec(),
            connect: connect.map(<[bool]>::to_vec),
        };
    }
    let ds = ds.min(len);
    match method {
        DownsampleMethod::Subsample => subsample(x, y, connect, ds),
        DownsampleMethod::Mean => mean(x, y, connect, ds),
        DownsampleMethod::Peak => peak(x, y, connect, ds),
    }
}

fn subsample(x: &[f64], y: &[f64], connect: Option<&[bool]>, ds: usize) -> Reduced {
    Reduced {
        x: x.iter().step_by(ds).copied().collect(),
        y: y.iter().step_by(ds).copied().collect(),
        // A kept point joins the next kept point only if every original
        // segment between them was joined.
        connect: connect.map(|c| c.chunks(ds).map(all_joined).collect()),
    }
}

fn mean(x: &[f64], y: &[f64], connect: Option<&[bool]>, ds: usize) -> Reduced {
    let buckets = x.len() / ds;
    let center = ds / 2;
    Reduced {
        x: (0..buckets).map(|i| x[i * ds + center]).collect(),
        y: y
            .chunks_exact(ds)
            .map(|bucket| bucket.iter().sum::<f64>() / ds as f64)
            .collect(),
        connect: connect.map(|c| bucket_links(c, ds)),
    }
}

fn peak(x: &[f64], y: &[f64], connect: Option<&[bool]>, ds: usize) -> Reduced {
    let buckets = x.len() / ds;
    let center = ds / 2;
    let mut out = Reduced {
        x: Vec::with_capacity(buckets * 2),
        y: Vec::with_capacity(buckets * 2),
        connect: connect.map(|_| Vec::with_capacity(buckets * 2)),
    };
    for (i, bucket) in y.chunks_exact(ds).enumerate() {
        let x_center = x[i * ds + center];
        let (min, max) = min_max(bucket);
        out.x.extend([x_center, x_center]);
        out.y.extend([max, min]);
    }
    if let (Some(out_connect), Some(connect)) = (out.connect.as_mut(), connect) {
        for joined in bucket_links(connect, ds) {
            out_connect.extend([true, joined]);
        }
    }
    out
}

/// One link per full bucket. The leftover tail is dropped with its points,
/// so its breaks fold into the last bucket's link.
fn bucket_links(connect: &[bool], ds: usize) -> Vec<bool> {
    let chunks = connect.chunks_exact(ds);
    let tail = all_joined(chunks.remainder());
    let mut links: Vec<bool> = chunks.map(all_joined).collect();
    if let Some(last) = links.last_mut() {
        *last &= tail;
    }
    links
}

fn all_joined(bucket: &[bool]) -> bool {
    bucket.iter().all(|joined| *joined)
}

/// Bucket extrema; a NaN anywhere in the bucket poisons both.
fn min_max(bucket: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in bucket {
        if value.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        min = min.min(*value);
        max = max.max(*value);
    }
    (min, max)
}

/// Pick a downsampling factor from the view width.
///
/// Assumes uniformly spaced X. `factor` is the number of pixels each output
/// point may span before more reduction is applied.
pub fn auto_factor(x: &[f64], view_width: f64, pixel_width: f32, factor: f64) -> usize {
    if x.len() < 2 || pixel_width <= 0.0 || factor <= 0.0 {
        return 1;
    }
    let dx = (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64;
    if dx == 0.0 || !dx.is_finite() {
        return 1;
    }
    let ds = (view_width / dx / (f64::from(pixel_width) * factor)).abs();
    if !ds.is_finite() {
        return 1;
    }
    ds.max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 600 points on [0, 7] with a gap in the middle; the break sits at 299.
    fn gapped() -> (Vec<f64>, Vec<f64>, Vec<bool>) {
        let full: Vec<f64> = (0..1000).map(|i| 7.0 * i as f64 / 999.0).collect();
        let x: Vec<f64> = full[..300].iter().chain(&full[700..]).copied().collect();
        let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
        let mut connect = vec![true; x.len()];
        connect[299] = false;
        (x, y, connect)
    }

    /// X of the output point right before each break.
    fn break_positions(reduced: &Reduced) -> Vec<f64> {
        let connect = reduced.connect.as_ref().expect("connect carried through");
        connect
            .iter()
            .zip(&reduced.x)
            .filter(|(joined, _)| !**joined)
            .map(|(_, x)| *x)
            .collect()
    }

    #[test]
    fn connect_length_follows_every_method() {
        let (x, y, connect) = gapped();
        for method in [
            DownsampleMethod::Subsample,
            DownsampleMethod::Mean,
            DownsampleMethod::Peak,
        ] {
            let reduced = downsample(&x, &y, Some(connect.as_slice()), 5, method);
            let connect = reduced.connect.as_ref().unwrap();
            assert_eq!(reduced.x.len(), reduced.y.len());
            assert_eq!(reduced.x.len(), connect.len(), "{method:?}");
        }
    }

    #[test]
    fn break_survives_every_method() {
        let (x, y, connect) = gapped();
        let gap_start = x[299];
        let gap_end = x[300];
        for method in [
            DownsampleMethod::Subsample,
            DownsampleMethod::Mean,
            DownsampleMethod::Peak,
        ] {
            let reduced = downsample(&x, &y, Some(connect.as_slice()), 5, method);
            let breaks = break_positions(&reduced);
            assert_eq!(breaks.len(), 1, "{method:?}");
            // The break is the last output point before the gap.
            assert!(breaks[0] <= gap_start, "{method:?}");
            let after = reduced.x.iter().find(|v| **v > breaks[0]).copied();
            assert!(after.is_some_and(|v| v >= gap_end), "{method:?}");
        }
    }

    #[test]
    fn subsample_keeps_every_nth() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let reduced = downsample(&x, &x, None, 3, DownsampleMethod::Subsample);
        assert_eq!(reduced.x, vec![0.0, 3.0, 6.0, 9.0]);
        assert!(reduced.connect.is_none());
    }

    #[test]
    fn mean_uses_bucket_center_and_average() {
        let x: Vec<f64> = (0..7).map(f64::from).collect();
        let y = vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 99.0];
        let reduced = downsample(&x, &y, None, 3, DownsampleMethod::Mean);
        assert_eq!(reduced.x, vec![1.0, 4.0]);
        assert_eq!(reduced.y, vec![2.0, 20.0]);
    }

    #[test]
    fn peak_emits_max_then_min() {
        let x: Vec<f64> = (0..4).map(f64::from).collect();
        let y = vec![1.0, 5.0, 0.5, 3.0];
        let reduced = downsample(&x, &y, None, 4, DownsampleMethod::Peak);
        assert_eq!(reduced.x, vec![2.0, 2.0]);
        assert_eq!(reduced.y, vec![5.0, 0.5]);
    }

    #[test]
    fn break_in_dropped_tail_reaches_last_bucket() {
        let x: Vec<f64> = (0..7).map(f64::from).collect();
        let connect = [true, true, true, true, true, true, false];
        let mean = downsample(&x, &x, Some(&connect[..]), 3, DownsampleMethod::Mean);
        assert_eq!(mean.connect, Some(vec![true, false]));
        let peak = downsample(&x, &x, Some(&connect[..]), 3, DownsampleMethod::Peak);
        assert_eq!(peak.connect, Some(vec![true, true, true, false]));
    }

    #[test]
    fn boundary_points_carry_their_links() {
        let x = vec![1.0, 2.0];
        let mut reduced = downsample(&x, &x, Some(&[true, true][..]), 1, DownsampleMethod::Peak);
        reduced.push_front(0.0, 0.0, false);
        reduced.push_back(3.0, 3.0, true);
        assert_eq!(reduced.x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(reduced.connect, Some(vec![false, true, true, true]));
        let mut plain = downsample(&x, &x, None, 1, DownsampleMethod::Mean);
        plain.push_back(3.0, 3.0, false);
        assert!(plain.connect.is_none());
    }

    #[test]
    fn factor_one_is_identity() {
        let x = vec![1.0, 2.0];
        let reduced = downsample(&x, &x, Some(&[true, false][..]), 1, DownsampleMethod::Peak);
        assert_eq!(reduced.x, x);
        assert_eq!(reduced.connect, Some(vec![true, false]));
    }

    #[test]
    fn auto_factor_scales_with_density() {
        let x: Vec<f64> = (0..10_000).map(f64::from).collect();
        assert_eq!(auto_factor(&x, 10_000.0, 200.0, 5.0), 10);
        assert_eq!(auto_factor(&x, 100.0, 200.0, 5.0), 1);
        assert_eq!(auto_factor(&[1.0, 1.0], 100.0, 200.0, 5.0), 1);
    }
}
