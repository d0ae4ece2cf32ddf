//! Shading: aggregate in, image out.

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, ShadeError};
use crate::types::{
    resolve_category_colours, AggregateData, ColorKey, ColorSpec, Colormap, RawAggregate,
};

use super::colorize;
use super::normalize::{normalize, How, Span};
use super::Image;

/// Default alpha of valid pixels.
pub const DEFAULT_ALPHA: u8 = 255;

/// Default lowest alpha for single-colour and categorical shading.
pub const DEFAULT_MIN_ALPHA: u8 = 40;

/// Options for [`shade`].
#[derive(Debug, Clone)]
pub struct ShadeOptions {
    /// Colormap for 2-D aggregates.
    pub cmap: Colormap,

    /// Category colours. Defaults to the built-in categorical palette.
    pub color_key: Option<ColorKey>,

    pub how: How,

    /// Fixed value range. Defaults to the data range.
    pub span: Option<Span>,

    pub alpha: u8,

    pub min_alpha: u8,
}

impl Default for ShadeOptions {
    fn default() -> Self {
        Self {
            cmap: Colormap::default(),
            color_key: None,
            how: How::default(),
            span: None,
            alpha: DEFAULT_ALPHA,
            min_alpha: DEFAULT_MIN_ALPHA,
        }
    }
}

impl ShadeOptions {
    pub fn with_cmap(mut self, cmap: impl Into<Colormap>) -> Self {
        self.cmap = cmap.into();
        self
    }

    pub fn with_color_key(mut self, key: ColorKey) -> Self {
        self.color_key = Some(key);
        self
    }

    pub fn with_how(mut self, how: How) -> Self {
        self.how = how;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_min_alpha(mut self, min_alpha: u8) -> Self {
        self.min_alpha = min_alpha;
        self
    }
}

/// Shade an aggregate into an image.
///
/// 2-D aggregates go through `opts.cmap`; categorical aggregates through
/// `opts.color_key`. Missing cells always come out as pixel `0`.
pub fn shade(agg: &RawAggregate, opts: &ShadeOptions) -> Result<Image> {
    let spec = match agg.data() {
        AggregateData::Grid(_) => opts.cmap.resolve()?,
        AggregateData::Categorical { categories, .. } => {
            resolve_category_colours(opts.color_key.as_ref(), categories)?
        }
    };
    debug!(how = %opts.how, spec = ?spec, "shading aggregate");

    let pixels = match (agg.data(), &spec) {
        (AggregateData::Grid(values), _) => match normalize(values, &opts.how, opts.span)? {
            None => Array2::zeros(values.dim()),
            Some(t) => colorize_grid(&t, &spec, opts)?,
        },
        (AggregateData::Categorical { weights, .. }, ColorSpec::Category(colours)) => {
            let totals = weights.totals();
            match normalize(&totals, &opts.how, opts.span)? {
                None => Array2::zeros(totals.dim()),
                Some(t) => {
                    colorize::category(&weights.to_f64(), colours, &t, opts.alpha, opts.min_alpha)
                }
            }
        }
        (AggregateData::Categorical { .. }, other) => return Err(spec_mismatch(other)),
    };

    Image::new(pixels, agg.coords().clone())
}

fn colorize_grid(t: &Array2<f64>, spec: &ColorSpec, opts: &ShadeOptions) -> Result<Array2<u32>> {
    match spec {
        ColorSpec::Ramp(stops) => Ok(colorize::ramp(t, stops, opts.alpha)),
        ColorSpec::Single(colour) => Ok(colorize::single(t, *colour, opts.alpha, opts.min_alpha)),
        ColorSpec::Continuous(f) => Ok(colorize::continuous(t, f, opts.alpha)),
        ColorSpec::Category(_) => Err(spec_mismatch(spec)),
    }
}

fn spec_mismatch(spec: &ColorSpec) -> ShadeError {
    ShadeError::InvalidColormap {
        message: format!("{:?} does not match the aggregate's layout", spec),
        help: Some(
            "Category colours shade categorical aggregates; colormaps shade 2-D grids"
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    use crate::types::{Colour, Coords, Values, Weights};

    #[test]
    fn test_category_colours_do_not_shade_grids() {
        let spec = ColorSpec::Category(vec![Colour::BLACK]);
        let err = colorize_grid(&array![[0.5]], &spec, &ShadeOptions::default()).unwrap_err();
        assert!(matches!(err, ShadeError::InvalidColormap { .. }));
    }

    #[test]
    fn test_categorical_uses_color_key() {
        let mut weights = Array3::<i64>::zeros((1, 2, 2));
        weights[[0, 0, 0]] = 4;
        weights[[0, 1, 1]] = 2;
        let agg = RawAggregate::categorical(
            Coords::index(1, 2),
            vec!["a".to_string(), "b".to_string()],
            Weights::Int(weights),
        )
        .unwrap();

        let opts = ShadeOptions::default()
            .with_color_key(ColorKey::list(&["red", "blue"]))
            .with_how(How::Linear)
            .with_min_alpha(0);
        let img = shade(&agg, &opts).unwrap();
        assert_eq!(img.get(0, 0), Some(Colour::new(255, 0, 0, 255)));
        assert_eq!(img.get(1, 0), Some(Colour::new(0, 0, 255, 0)));
    }

    #[test]
    fn test_all_missing_grid_is_transparent() {
        let agg = RawAggregate::from_values(Values::Float(Array2::from_elem((2, 2), f64::NAN)));
        let img = shade(&agg, &ShadeOptions::default()).unwrap();
        assert_eq!(img.count_visible(), 0);
    }
}
