//! Histogram equalization.
//!
//! Values are remapped through the empirical CDF of the non-masked
//! entries, so the output is approximately uniform on [0, 1].

use ndarray::{Array2, Zip};
use rayon::prelude::*;

/// Number of equal-width bins used for floating-point data.
pub const DEFAULT_NBINS: usize = 65_536;

/// Fewest values binned per task; each task owns a full count vector.
const MIN_CHUNK: usize = 1 << 14;

/// Equalize a floating-point grid.
///
/// Entries that are NaN or set in `mask` are excluded from the histogram
/// and come back as NaN.
pub fn eq_hist(values: &Array2<f64>, mask: Option<&Array2<bool>>) -> Array2<f64> {
    eq_hist_with_bins(values, mask, DEFAULT_NBINS)
}

/// Equalize a floating-point grid using `nbins` histogram bins.
///
/// Infinite entries stay out of the histogram and map to the ends of the
/// CDF.
pub fn eq_hist_with_bins(values: &Array2<f64>, mask: Option<&Array2<bool>>, nbins: usize) -> Array2<f64> {
    let mask = resolve_mask(values, mask);
    let valid: Vec<f64> = Zip::from(values)
        .and(&mask)
        .fold(Vec::new(), |mut acc, &v, &m| {
            if !m && v.is_finite() {
                acc.push(v);
            }
            acc
        });

    let Some(cdf) = float_cdf(&valid, nbins.max(1)) else {
        return Array2::from_elem(values.dim(), f64::NAN);
    };
    remap(values, &mask, &cdf)
}

/// Equalize an integer grid.
///
/// Integer data gets one bin per distinct value between its minimum and
/// maximum, unless that range exceeds [`DEFAULT_NBINS`], in which case the
/// floating-point histogram is used. `mask` defaults to nothing missing.
pub fn eq_hist_int(values: &Array2<i64>, mask: Option<&Array2<bool>>) -> Array2<f64> {
    let mask = match mask {
        Some(m) => m.clone(),
        None => Array2::from_elem(values.dim(), false),
    };
    let valid: Vec<i64> = Zip::from(values)
        .and(&mask)
        .fold(Vec::new(), |mut acc, &v, &m| {
            if !m {
                acc.push(v);
            }
            acc
        });

    let as_float = values.mapv(|v| v as f64);
    let (Some(&lo), Some(&hi)) = (valid.iter().min(), valid.iter().max()) else {
        return Array2::from_elem(values.dim(), f64::NAN);
    };

    let range = hi.abs_diff(lo);
    if range >= DEFAULT_NBINS as u64 {
        return eq_hist_with_bins(&as_float, Some(&mask), DEFAULT_NBINS);
    }

    let mut counts = vec![0u64; range as usize + 1];
    for v in &valid {
        counts[(v - lo) as usize] += 1;
    }
    let centres: Vec<f64> = (0..counts.len()).map(|i| (lo + i as i64) as f64).collect();
    let cdf = Cdf::new(centres, &counts);
    remap(&as_float, &mask, &cdf)
}

/// Cumulative distribution sampled at bin centres.
struct Cdf {
    centres: Vec<f64>,
    values: Vec<f64>,
}

impl Cdf {
    fn new(centres: Vec<f64>, counts: &[u64]) -> Self {
        let mut running = 0u64;
        let cumulative: Vec<u64> = counts
            .iter()
            .map(|&c| {
                running += c;
                running
            })
            .collect();
        let total = running.max(1) as f64;
        let values = cumulative.iter().map(|&c| c as f64 / total).collect();
        Self { centres, values }
    }
}

fn resolve_mask(values: &Array2<f64>, mask: Option<&Array2<bool>>) -> Array2<bool> {
    match mask {
        Some(m) => Zip::from(values).and(m).map_collect(|v, &m| m || v.is_nan()),
        None => values.mapv(f64::is_nan),
    }
}

fn float_cdf(valid: &[f64], nbins: usize) -> Option<Cdf> {
    let lo = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if valid.is_empty() || !lo.is_finite() || !hi.is_finite() {
        return None;
    }

    let (first, last) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let edges = linspace(first, last, nbins + 1);
    let norm = nbins as f64 / (last - first);

    let counts = valid
        .par_iter()
        .with_min_len(MIN_CHUNK)
        .fold(
            || vec![0u64; nbins],
            |mut counts, &v| {
                counts[bin_index(v, first, norm, &edges)] += 1;
                counts
            },
        )
        .reduce(
            || vec![0u64; nbins],
            |mut total, part| {
                total.iter_mut().zip(part).for_each(|(t, p)| *t += p);
                total
            },
        );

    let centres = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    Some(Cdf::new(centres, &counts))
}

/// Evenly spaced samples including both endpoints.
fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![start];
    }
    let step = (stop - start) / (num - 1) as f64;
    let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
    out[num - 1] = stop;
    out
}

/// Bin of `v` among equal-width `edges`, with the last bin closed on the right.
fn bin_index(v: f64, first: f64, norm: f64, edges: &[f64]) -> usize {
    let nbins = edges.len() - 1;
    let mut i = (((v - first) * norm) as usize).min(nbins - 1);
    // Float error in the scaled index can land one bin off
    if v < edges[i] && i > 0 {
        i -= 1;
    } else if v >= edges[i + 1] && i != nbins - 1 {
        i += 1;
    }
    i
}

fn remap(values: &Array2<f64>, mask: &Array2<bool>, cdf: &Cdf) -> Array2<f64> {
    Zip::from(values).and(mask).par_map_collect(|&v, &m| {
        if m {
            f64::NAN
        } else {
            interp(v, &cdf.centres, &cdf.values)
        }
    })
}

/// Piecewise-linear interpolation through `(xp, fp)`, clamped at both ends.
pub(crate) fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    let j = xp.partition_point(|&c| c <= x) - 1;
    if x == xp[j] {
        return fp[j];
    }
    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
    slope * (x - xp[j]) + fp[j]
}
