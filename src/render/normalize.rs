//! Value normalization.
//!
//! Maps a raw grid to [0, 1] through a monotone transform. Works on a
//! private `f64` copy, so the caller's grid is never touched.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{array, Array2, Zip};

use crate::error::{Result, ShadeError};
use crate::types::Values;

use super::eq_hist::{eq_hist, eq_hist_int};

/// A caller-supplied transform. Receives the offset grid and the missing
/// mask and returns a grid of the same shape.
pub type CustomTransform = Arc<dyn Fn(&Array2<f64>, &Array2<bool>) -> Array2<f64> + Send + Sync>;

/// Interpolation method.
#[derive(Clone, Default)]
pub enum How {
    Linear,
    #[default]
    Log,
    Cbrt,
    EqHist,
    Custom(CustomTransform),
}

impl How {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Array2<f64>, &Array2<bool>) -> Array2<f64> + Send + Sync + 'static,
    {
        How::Custom(Arc::new(f))
    }

    pub fn name(&self) -> &'static str {
        match self {
            How::Linear => "linear",
            How::Log => "log",
            How::Cbrt => "cbrt",
            How::EqHist => "eq_hist",
            How::Custom(_) => "custom",
        }
    }

    /// Apply a pointwise transform. `None` for the rank-based methods.
    fn pointwise(&self, v: f64) -> Option<f64> {
        match self {
            How::Linear => Some(v),
            How::Log => Some(v.ln_1p()),
            How::Cbrt => Some(v.powf(1.0 / 3.0)),
            How::EqHist | How::Custom(_) => None,
        }
    }
}

impl FromStr for How {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "linear" => Ok(How::Linear),
            "log" => Ok(How::Log),
            "cbrt" => Ok(How::Cbrt),
            "eq_hist" => Ok(How::EqHist),
            other => Err(ShadeError::InvalidHow {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Debug for How {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for How {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed value range `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    lo: f64,
    hi: f64,
}

impl Span {
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if lo.is_nan() || hi.is_nan() {
            return Err(ShadeError::InvalidSpan {
                message: format!("span bounds must be numbers, got ({}, {})", lo, hi),
                help: None,
            });
        }
        if lo > hi {
            return Err(ShadeError::InvalidSpan {
                message: format!("span lower bound {} is above upper bound {}", lo, hi),
                help: Some("Pass the span as [lo, hi]".to_string()),
            });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }
}

/// Normalize `values` to [0, 1].
///
/// Missing cells come back as NaN. Returns `None` when every cell is
/// missing.
pub fn normalize(values: &Values, how: &How, span: Option<Span>) -> Result<Option<Array2<f64>>> {
    if span.is_some() && matches!(how, How::EqHist) {
        return Err(ShadeError::InvalidSpan {
            message: "a span cannot be combined with eq_hist".to_string(),
            help: Some("Drop the span or use linear, log or cbrt".to_string()),
        });
    }

    let mask = values.missing_mask();
    if mask.iter().all(|&m| m) {
        return Ok(None);
    }

    let mut data = values.to_f64();
    let offset = match span {
        Some(span) => {
            Zip::from(&mut data).and(&mask).for_each(|v, &m| {
                if !m {
                    *v = v.clamp(span.lo, span.hi);
                }
            });
            span.lo
        }
        None => {
            let lo = min_max(&data, &mask).0;
            if lo.is_finite() {
                lo
            } else {
                0.0
            }
        }
    };

    let shifted = Zip::from(&data)
        .and(&mask)
        .par_map_collect(|&v, &m| if m { f64::NAN } else { v - offset });

    let transformed = transform(how, &shifted, &mask, values.is_integral())?;

    let (lo, hi) = match span {
        Some(span) => transformed_span(how, span)?,
        None => min_max(&transformed, &mask),
    };

    // Infinite cells pin to the ends of the range whatever the transform
    let normalized = Zip::from(&transformed)
        .and(&shifted)
        .and(&mask)
        .par_map_collect(|&t, &s, &m| {
            if m {
                f64::NAN
            } else if s.is_infinite() {
                if s > 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else if t.is_nan() {
                f64::NAN
            } else if hi == lo {
                1.0
            } else {
                ((t - lo) / (hi - lo)).clamp(0.0, 1.0)
            }
        });

    Ok(Some(normalized))
}

fn transform(how: &How, shifted: &Array2<f64>, mask: &Array2<bool>, integral: bool) -> Result<Array2<f64>> {
    match how {
        How::EqHist if integral => {
            let ints = shifted.mapv(|v| if v.is_nan() { 0 } else { v as i64 });
            Ok(eq_hist_int(&ints, Some(mask)))
        }
        How::EqHist => Ok(eq_hist(shifted, Some(mask))),
        How::Custom(f) => {
            let mut out = f(shifted, mask);
            check_custom_shape(&out, shifted.dim())?;
            Zip::from(&mut out).and(mask).for_each(|v, &m| {
                if m {
                    *v = f64::NAN;
                }
            });
            Ok(out)
        }
        _ => Ok(shifted.mapv(|v| how.pointwise(v).unwrap_or(f64::NAN))),
    }
}

/// The transform applied to `[0, hi - lo]`.
fn transformed_span(how: &How, span: Span) -> Result<(f64, f64)> {
    let width = span.hi - span.lo;
    match how {
        How::Custom(f) => {
            let ends = array![[0.0, width]];
            let out = f(&ends, &Array2::from_elem((1, 2), false));
            check_custom_shape(&out, (1, 2))?;
            Ok((out[[0, 0]], out[[0, 1]]))
        }
        _ => {
            let lo = how.pointwise(0.0).unwrap_or(0.0);
            let hi = how.pointwise(width).unwrap_or(width);
            Ok((lo, hi))
        }
    }
}

fn check_custom_shape(out: &Array2<f64>, expected: (usize, usize)) -> Result<()> {
    if out.dim() != expected {
        return Err(ShadeError::ShapeMismatch {
            message: format!(
                "custom transform returned a {}x{} grid for a {}x{} input",
                out.nrows(),
                out.ncols(),
                expected.0,
                expected.1
            ),
        });
    }
    Ok(())
}

/// Min and max over non-missing, finite cells.
fn min_max(data: &Array2<f64>, mask: &Array2<bool>) -> (f64, f64) {
    Zip::from(data)
        .and(mask)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v, &m| {
            if m || !v.is_finite() {
                (lo, hi)
            } else {
                (lo.min(v), hi.max(v))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_grid() -> Values {
        Values::Int(array![[0, 10, 11], [12, 0, 14], [15, 16, 0]])
    }

    #[test]
    fn test_how_from_str() {
        assert!(matches!("linear".parse::<How>(), Ok(How::Linear)));
        assert!(matches!("eq_hist".parse::<How>(), Ok(How::EqHist)));
        assert!(matches!(
            "cubic".parse::<How>(),
            Err(ShadeError::InvalidHow { .. })
        ));
    }

    #[test]
    fn test_span_validation() {
        assert!(Span::new(0.0, 1.0).is_ok());
        assert!(Span::new(2.0, 2.0).is_ok());
        assert!(Span::new(1.0, 0.0).is_err());
        assert!(Span::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_linear_normalization() {
        let out = normalize(&int_grid(), &How::Linear, None).unwrap().unwrap();
        assert!(out[[0, 0]].is_nan());
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[2, 1]], 1.0);
        assert!((out[[1, 0]] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_span_clips_both_ends() {
        let span = Span::new(11.0, 15.0).unwrap();
        let out = normalize(&int_grid(), &How::Linear, Some(span)).unwrap().unwrap();
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[0, 2]], 0.0);
        assert_eq!(out[[2, 0]], 1.0);
        assert_eq!(out[[2, 1]], 1.0);
    }

    #[test]
    fn test_span_with_eq_hist_is_rejected() {
        let span = Span::new(0.0, 1.0).unwrap();
        let err = normalize(&int_grid(), &How::EqHist, Some(span)).unwrap_err();
        assert!(matches!(err, ShadeError::InvalidSpan { .. }));
    }

    #[test]
    fn test_all_missing_and_degenerate() {
        let empty = Values::Float(Array2::from_elem((2, 2), f64::NAN));
        assert!(normalize(&empty, &How::Log, None).unwrap().is_none());

        let flat = Values::Float(array![[5.0, f64::NAN], [5.0, 5.0]]);
        let out = normalize(&flat, &How::Log, None).unwrap().unwrap();
        assert_eq!(out[[0, 0]], 1.0);
        assert!(out[[0, 1]].is_nan());
    }

    #[test]
    fn test_infinite_cells_pin_to_range_ends() {
        let values = Values::Float(array![[1.0, 2.0], [3.0, f64::INFINITY]]);

        let out = normalize(&values, &How::Linear, None).unwrap().unwrap();
        assert_eq!(out, array![[0.0, 0.5], [1.0, 1.0]]);

        for how in [How::Log, How::Cbrt, How::EqHist] {
            let out = normalize(&values, &how, None).unwrap().unwrap();
            assert!(out.iter().all(|v| !v.is_nan()), "{} left a gap", how);
            assert!(out[[0, 0]] < out[[0, 1]] && out[[0, 1]] < out[[1, 0]]);
            assert_eq!(out[[1, 1]], 1.0);
        }

        let values = Values::Float(array![[f64::NEG_INFINITY, 2.0], [4.0, f64::NAN]]);
        let out = normalize(&values, &How::Log, None).unwrap().unwrap();
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 0]], 1.0);
        assert!(out[[1, 1]].is_nan());

        let only_infinite = Values::Float(array![[f64::INFINITY, f64::NEG_INFINITY]]);
        let out = normalize(&only_infinite, &How::Linear, None).unwrap().unwrap();
        assert_eq!(out, array![[1.0, 0.0]]);
    }

    #[test]
    fn test_custom_sees_offset_values() {
        let square = How::custom(|v, _mask| v.mapv(|x| x * x));
        let out = normalize(&int_grid(), &square, None).unwrap().unwrap();
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[2, 1]], 1.0);
        assert!((out[[1, 0]] - 4.0 / 36.0).abs() < 1e-12);

        let bad = How::custom(|_, _| Array2::zeros((1, 1)));
        assert!(normalize(&int_grid(), &bad, None).is_err());
    }

    #[test]
    fn test_input_is_untouched() {
        let values = Values::Float(array![[1.0, 100.0], [f64::NAN, 50.0]]);
        let before = values.clone();
        let span = Span::new(10.0, 60.0).unwrap();
        normalize(&values, &How::Linear, Some(span)).unwrap();
        match (&values, &before) {
            (Values::Float(a), Values::Float(b)) => {
                assert_eq!(a[[0, 0]], b[[0, 0]]);
                assert_eq!(a[[0, 1]], b[[0, 1]]);
            }
            _ => unreachable!(),
        }
    }
}
