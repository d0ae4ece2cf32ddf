//! Mapping normalized values to packed pixels.
//!
//! Every function here is a pure per-cell map over a grid of normalized
//! values (NaN = missing) and runs in parallel.

use ndarray::{Array2, Array3, Zip};

use crate::types::{Colour, ColourFn};

/// Interpolate across evenly spaced `stops`.
pub fn ramp(normalized: &Array2<f64>, stops: &[Colour], alpha: u8) -> Array2<u32> {
    Zip::from(normalized).par_map_collect(|&t| {
        if t.is_nan() {
            0
        } else {
            ramp_colour(t, stops).with_alpha(alpha).to_packed()
        }
    })
}

/// Fixed colour with alpha scaled between `min_alpha` and `alpha`.
pub fn single(normalized: &Array2<f64>, colour: Colour, alpha: u8, min_alpha: u8) -> Array2<u32> {
    Zip::from(normalized).par_map_collect(|&t| {
        if t.is_nan() {
            0
        } else {
            colour.with_alpha(scaled_alpha(t, alpha, min_alpha)).to_packed()
        }
    })
}

/// Colour from a continuous colormap; alpha is `alpha` for every valid cell.
pub fn continuous(normalized: &Array2<f64>, cmap: &ColourFn, alpha: u8) -> Array2<u32> {
    Zip::from(normalized).par_map_collect(|&t| {
        if t.is_nan() {
            0
        } else {
            cmap(t).with_alpha(alpha).to_packed()
        }
    })
}

/// Weighted average of category colours.
///
/// `weights` is indexed (y, x, category) with NaN already zeroed and
/// `normalized_totals` is the normalized per-cell total.
pub fn category(
    weights: &Array3<f64>,
    colours: &[Colour],
    normalized_totals: &Array2<f64>,
    alpha: u8,
    min_alpha: u8,
) -> Array2<u32> {
    Zip::indexed(normalized_totals).par_map_collect(|(y, x), &t| {
        let mut total = 0.0;
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        for (k, colour) in colours.iter().enumerate() {
            let w = weights[[y, x, k]];
            total += w;
            r += w * colour.r as f64;
            g += w * colour.g as f64;
            b += w * colour.b as f64;
        }

        if total == 0.0 || t.is_nan() {
            return 0;
        }

        Colour::new(
            (r / total) as u8,
            (g / total) as u8,
            (b / total) as u8,
            scaled_alpha(t, alpha, min_alpha),
        )
        .to_packed()
    })
}

fn ramp_colour(t: f64, stops: &[Colour]) -> Colour {
    let n = stops.len();
    if n == 1 {
        return stops[0];
    }

    let pos = t * (n - 1) as f64;
    let j = (pos.floor() as usize).min(n - 2);
    let f = pos - j as f64;
    let (lo, hi) = (stops[j], stops[j + 1]);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f) as u8;

    Colour::rgb(lerp(lo.r, hi.r), lerp(lo.g, hi.g), lerp(lo.b, hi.b))
}

fn scaled_alpha(t: f64, alpha: u8, min_alpha: u8) -> u8 {
    let lo = min_alpha as f64;
    (lo + (alpha as f64 - lo) * t) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::Arc;

    #[test]
    fn test_ramp_endpoints_and_missing() {
        let stops = [Colour::rgb(0, 0, 0), Colour::rgb(255, 255, 255)];
        let out = ramp(&array![[0.0, 1.0, f64::NAN]], &stops, 255);
        let expected: Array2<u32> = array![[0xff000000, 0xffffffff, 0]];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_three_stop_ramp_midpoint() {
        let stops = [
            Colour::rgb(255, 0, 0),
            Colour::rgb(0, 255, 0),
            Colour::rgb(0, 0, 255),
        ];
        assert_eq!(ramp_colour(0.5, &stops), Colour::rgb(0, 255, 0));
        assert_eq!(ramp_colour(1.0, &stops), Colour::rgb(0, 0, 255));
        assert_eq!(ramp_colour(0.25, &stops), Colour::rgb(127, 127, 0));
    }

    #[test]
    fn test_single_alpha_range() {
        let out = single(&array![[0.0, 1.0, f64::NAN]], Colour::BLACK, 255, 40);
        let expected: Array2<u32> = array![[40 << 24, 255 << 24, 0]];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_continuous_uses_function() {
        let cmap: ColourFn = Arc::new(|t: f64| Colour::rgb((t * 255.0) as u8, 0, 0));
        let out = continuous(&array![[0.0, 1.0, f64::NAN]], &cmap, 128);
        let expected: Array2<u32> = array![[0x80000000, 0x800000ff, 0]];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_category_mixes_weights() {
        let mut weights = Array3::<f64>::zeros((1, 2, 2));
        weights[[0, 0, 0]] = 1.0;
        weights[[0, 0, 1]] = 1.0;
        let colours = [Colour::rgb(255, 0, 0), Colour::rgb(0, 0, 255)];
        let out = category(&weights, &colours, &array![[1.0, f64::NAN]], 255, 40);
        let expected: Array2<u32> = array![[Colour::new(127, 0, 127, 255).to_packed(), 0]];
        assert_eq!(out, expected);
    }
}
