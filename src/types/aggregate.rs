//! Aggregated input grids.
//!
//! A `RawAggregate` is the read-only output of an upstream binning step:
//! either a 2-D grid of scalars or a 3-D grid of per-category weights.
//! Nothing in the pipeline mutates it.

use ndarray::{Array2, Array3, Axis as ArrayAxis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadeError};

/// Coordinate labels along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Label(Vec<String>),
}

impl CoordValues {
    /// Number of labels.
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Int(v) => v.len(),
            CoordValues::Float(v) => v.len(),
            CoordValues::Label(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named axis with its coordinate labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub values: CoordValues,
}

impl Axis {
    pub fn new(name: impl Into<String>, values: CoordValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// An axis labelled `0..len`.
    pub fn index(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, CoordValues::Int((0..len as i64).collect()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The (y, x) coordinates of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub y: Axis,
    pub x: Axis,
}

impl Coords {
    pub fn new(y: Axis, x: Axis) -> Self {
        Self { y, x }
    }

    /// Index coordinates for a grid of `height` rows and `width` columns.
    pub fn index(height: usize, width: usize) -> Self {
        Self::new(Axis::index("y", height), Axis::index("x", width))
    }

    /// Grid shape implied by the coordinates, as (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

/// A 2-D grid of scalars.
///
/// A cell is missing when it is NaN (floats) or zero (integers and bools).
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Int(Array2<i64>),
    UInt(Array2<u64>),
    Float(Array2<f64>),
    Bool(Array2<bool>),
}

impl Values {
    /// Grid shape as (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Values::Int(a) => a.dim(),
            Values::UInt(a) => a.dim(),
            Values::Float(a) => a.dim(),
            Values::Bool(a) => a.dim(),
        }
    }

    /// `true` where the cell is missing.
    pub fn missing_mask(&self) -> Array2<bool> {
        match self {
            Values::Int(a) => a.mapv(|v| v == 0),
            Values::UInt(a) => a.mapv(|v| v == 0),
            Values::Float(a) => a.mapv(f64::is_nan),
            Values::Bool(a) => a.mapv(|v| !v),
        }
    }

    /// Floating-point copy of the grid. Bools map to 0.0 / 1.0.
    pub fn to_f64(&self) -> Array2<f64> {
        match self {
            Values::Int(a) => a.mapv(|v| v as f64),
            Values::UInt(a) => a.mapv(|v| v as f64),
            Values::Float(a) => a.clone(),
            Values::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
        }
    }

    /// Whether the grid has an integer kind (int, uint or bool).
    pub fn is_integral(&self) -> bool {
        !matches!(self, Values::Float(_))
    }
}

/// Per-category weights, indexed (y, x, category).
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Int(Array3<i64>),
    Float(Array3<f64>),
}

impl Weights {
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            Weights::Int(a) => a.dim(),
            Weights::Float(a) => a.dim(),
        }
    }

    /// Floating-point copy with NaN weights replaced by zero.
    pub fn to_f64(&self) -> Array3<f64> {
        match self {
            Weights::Int(a) => a.mapv(|v| v as f64),
            Weights::Float(a) => a.mapv(|v| if v.is_nan() { 0.0 } else { v }),
        }
    }

    /// Sum of weights per cell. Cells with a zero total come back missing.
    pub fn totals(&self) -> Values {
        match self {
            Weights::Int(a) => Values::Int(a.sum_axis(ArrayAxis(2))),
            Weights::Float(_) => {
                let totals = self.to_f64().sum_axis(ArrayAxis(2));
                Values::Float(totals.mapv(|t| if t == 0.0 { f64::NAN } else { t }))
            }
        }
    }
}

/// Contents of an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateData {
    Grid(Values),
    Categorical { categories: Vec<String>, weights: Weights },
}

/// An aggregated grid with its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAggregate {
    coords: Coords,
    data: AggregateData,
}

impl RawAggregate {
    /// Create a 2-D aggregate.
    pub fn new(coords: Coords, values: Values) -> Result<Self> {
        check_coords(&coords, values.dim())?;
        Ok(Self {
            coords,
            data: AggregateData::Grid(values),
        })
    }

    /// Create a 2-D aggregate with index coordinates.
    pub fn from_values(values: Values) -> Self {
        let (height, width) = values.dim();
        Self {
            coords: Coords::index(height, width),
            data: AggregateData::Grid(values),
        }
    }

    /// Create a categorical aggregate.
    ///
    /// `weights` is indexed (y, x, category) and must be non-negative.
    /// NaN weights are treated as absent.
    pub fn categorical(coords: Coords, categories: Vec<String>, weights: Weights) -> Result<Self> {
        let (height, width, depth) = weights.dim();
        check_coords(&coords, (height, width))?;

        if categories.len() != depth {
            return Err(ShadeError::InvalidAggregate {
                message: format!(
                    "{} category labels for a category axis of length {}",
                    categories.len(),
                    depth
                ),
                help: None,
            });
        }

        let negative = match &weights {
            Weights::Int(a) => a.iter().any(|&v| v < 0),
            Weights::Float(a) => a.iter().any(|&v| v < 0.0),
        };
        if negative {
            return Err(ShadeError::InvalidAggregate {
                message: "categorical weights must be non-negative".to_string(),
                help: Some("Use NaN or zero for absent categories".to_string()),
            });
        }

        Ok(Self {
            coords,
            data: AggregateData::Categorical {
                categories,
                weights,
            },
        })
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn data(&self) -> &AggregateData {
        &self.data
    }

    /// Grid shape as (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        self.coords.shape()
    }

    /// Category labels, if categorical.
    pub fn categories(&self) -> Option<&[String]> {
        match &self.data {
            AggregateData::Categorical { categories, .. } => Some(categories),
            AggregateData::Grid(_) => None,
        }
    }
}

fn check_coords(coords: &Coords, (height, width): (usize, usize)) -> Result<()> {
    if coords.shape() != (height, width) {
        let (cy, cx) = coords.shape();
        return Err(ShadeError::InvalidAggregate {
            message: format!(
                "coordinates are {}x{} but data is {}x{}",
                cy, cx, height, width
            ),
            help: Some("Provide one coordinate label per row and column".to_string()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_missing_mask_per_kind() {
        let ints = Values::Int(array![[0, 1], [2, 0]]);
        assert_eq!(ints.missing_mask(), array![[true, false], [false, true]]);

        let floats = Values::Float(array![[f64::NAN, 0.0]]);
        assert_eq!(floats.missing_mask(), array![[true, false]]);

        let bools = Values::Bool(array![[true, false]]);
        assert_eq!(bools.missing_mask(), array![[false, true]]);
        assert_eq!(bools.to_f64(), array![[1.0, 0.0]]);
    }

    #[test]
    fn test_coords_must_match_shape() {
        let values = Values::Int(array![[1, 2, 3], [4, 5, 6]]);
        assert!(RawAggregate::new(Coords::index(2, 3), values.clone()).is_ok());

        let err = RawAggregate::new(Coords::index(3, 2), values).unwrap_err();
        assert!(matches!(err, ShadeError::InvalidAggregate { .. }));
    }

    #[test]
    fn test_categorical_validation() {
        let weights = Weights::Float(Array3::from_elem((2, 2, 2), 1.0));
        let cats = vec!["a".to_string(), "b".to_string()];
        assert!(RawAggregate::categorical(Coords::index(2, 2), cats.clone(), weights).is_ok());

        let short = Weights::Float(Array3::from_elem((2, 2, 3), 1.0));
        assert!(RawAggregate::categorical(Coords::index(2, 2), cats.clone(), short).is_err());

        let negative = Weights::Int(Array3::from_elem((2, 2, 2), -1));
        assert!(RawAggregate::categorical(Coords::index(2, 2), cats, negative).is_err());
    }

    #[test]
    fn test_float_totals_treat_nan_as_zero() {
        let mut w = Array3::<f64>::zeros((1, 2, 2));
        w[[0, 0, 0]] = f64::NAN;
        w[[0, 1, 0]] = 2.0;
        w[[0, 1, 1]] = f64::NAN;
        let totals = match Weights::Float(w).totals() {
            Values::Float(t) => t,
            other => panic!("unexpected totals {:?}", other),
        };
        assert!(totals[[0, 0]].is_nan());
        assert_eq!(totals[[0, 1]], 2.0);
    }
}
