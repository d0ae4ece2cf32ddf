//! Aggregate loading from JSON.
//!
//! ```json
//! {
//!   "dtype": "int",
//!   "dims": ["y", "x"],
//!   "coords": { "y": [0, 1], "x": [0.5, 1.5] },
//!   "data": [[1, 2], [null, 4]]
//! }
//! ```
//!
//! `null` cells are missing. A 3-D `data` array needs `categories` and is
//! read as per-category weights.

use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array2, Array3};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ShadeError};
use crate::types::{Axis, CoordValues, Coords, RawAggregate, Values, Weights};

/// Element type of the data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Int,
    Uint,
    #[default]
    Float,
    Bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AggregateDoc {
    #[serde(default)]
    dtype: Dtype,

    #[serde(default)]
    dims: Option<Vec<String>>,

    #[serde(default)]
    coords: HashMap<String, CoordValues>,

    #[serde(default)]
    categories: Option<Vec<String>>,

    data: Value,
}

/// Load an aggregate from a JSON file.
pub fn load_aggregate(path: &Path) -> Result<RawAggregate> {
    let content = std::fs::read_to_string(path).map_err(|e| ShadeError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read aggregate: {}", e),
    })?;

    parse_aggregate(&content)
}

/// Parse an aggregate from a JSON string.
pub fn parse_aggregate(json: &str) -> Result<RawAggregate> {
    let doc: AggregateDoc = serde_json::from_str(json).map_err(|e| ShadeError::Parse {
        message: format!("Invalid aggregate: {}", e),
        help: Some("Expected an object with a 'data' array".to_string()),
    })?;

    let is_cube = doc
        .data
        .as_array()
        .and_then(|rows| rows.first())
        .and_then(Value::as_array)
        .and_then(|row| row.first())
        .is_some_and(Value::is_array);

    let (y_name, x_name) = match doc.dims.as_deref() {
        None => ("y".to_string(), "x".to_string()),
        Some([y, x]) | Some([y, x, _]) => (y.clone(), x.clone()),
        Some(other) => {
            return Err(invalid(format!(
                "dims must name 2 or 3 axes, got {}",
                other.len()
            )))
        }
    };

    if is_cube {
        let categories = doc.categories.clone().ok_or_else(|| ShadeError::InvalidAggregate {
            message: "3-D data needs a 'categories' list".to_string(),
            help: Some("Name each entry of the innermost axis".to_string()),
        })?;

        let weights = match doc.dtype {
            Dtype::Float => Weights::Float(cube(&doc.data, cell_f64)?),
            Dtype::Int | Dtype::Uint => Weights::Int(cube(&doc.data, cell_i64)?),
            Dtype::Bool => Weights::Int(cube(&doc.data, |v| cell_bool(v).map(i64::from))?),
        };
        let (h, w, _) = weights.dim();
        let coords = coords(&doc, y_name, x_name, h, w);
        return RawAggregate::categorical(coords, categories, weights);
    }

    let values = match doc.dtype {
        Dtype::Int => Values::Int(grid(&doc.data, cell_i64)?),
        Dtype::Uint => Values::UInt(grid(&doc.data, cell_u64)?),
        Dtype::Float => Values::Float(grid(&doc.data, cell_f64)?),
        Dtype::Bool => Values::Bool(grid(&doc.data, cell_bool)?),
    };
    let (h, w) = values.dim();
    let coords = coords(&doc, y_name, x_name, h, w);
    RawAggregate::new(coords, values)
}

fn coords(doc: &AggregateDoc, y_name: String, x_name: String, h: usize, w: usize) -> Coords {
    let axis = |name: String, len: usize| match doc.coords.get(&name) {
        Some(values) => Axis::new(name, values.clone()),
        None => Axis::index(name, len),
    };
    Coords::new(axis(y_name, h), axis(x_name, w))
}

fn grid<T>(data: &Value, cell: impl Fn(&Value) -> Result<T>) -> Result<Array2<T>> {
    let rows = as_array(data, "data")?;
    let width = rows.first().map_or(Ok(0), |r| as_array(r, "row").map(Vec::len))?;

    let mut flat = Vec::with_capacity(rows.len() * width);
    for (y, row) in rows.iter().enumerate() {
        let row = as_array(row, "row")?;
        if row.len() != width {
            return Err(invalid(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
        for v in row {
            flat.push(cell(v)?);
        }
    }

    Array2::from_shape_vec((rows.len(), width), flat).map_err(|e| invalid(e.to_string()))
}

fn cube<T>(data: &Value, cell: impl Fn(&Value) -> Result<T>) -> Result<Array3<T>> {
    let rows = as_array(data, "data")?;
    let width = rows.first().map_or(Ok(0), |r| as_array(r, "row").map(Vec::len))?;
    let depth = rows
        .first()
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let mut flat = Vec::with_capacity(rows.len() * width * depth);
    for (y, row) in rows.iter().enumerate() {
        let row = as_array(row, "row")?;
        if row.len() != width {
            return Err(invalid(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
        for (x, cellv) in row.iter().enumerate() {
            let weights = as_array(cellv, "cell")?;
            if weights.len() != depth {
                return Err(invalid(format!(
                    "cell ({}, {}) has {} weights, expected {}",
                    y,
                    x,
                    weights.len(),
                    depth
                )));
            }
            for v in weights {
                flat.push(cell(v)?);
            }
        }
    }

    Array3::from_shape_vec((rows.len(), width, depth), flat).map_err(|e| invalid(e.to_string()))
}

fn as_array<'a>(v: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    v.as_array()
        .ok_or_else(|| invalid(format!("expected {} to be an array, got {}", what, v)))
}

fn cell_f64(v: &Value) -> Result<f64> {
    match v {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n.as_f64().ok_or_else(|| bad_cell(v, "float")),
        _ => Err(bad_cell(v, "float")),
    }
}

fn cell_i64(v: &Value) -> Result<i64> {
    match v {
        Value::Null => Ok(0),
        Value::Number(n) => n.as_i64().ok_or_else(|| bad_cell(v, "int")),
        _ => Err(bad_cell(v, "int")),
    }
}

fn cell_u64(v: &Value) -> Result<u64> {
    match v {
        Value::Null => Ok(0),
        Value::Number(n) => n.as_u64().ok_or_else(|| bad_cell(v, "uint")),
        _ => Err(bad_cell(v, "uint")),
    }
}

fn cell_bool(v: &Value) -> Result<bool> {
    match v {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => Err(bad_cell(v, "bool")),
    }
}

fn bad_cell(v: &Value, dtype: &str) -> ShadeError {
    invalid(format!("cannot read {} as {}", v, dtype))
}

fn invalid(message: String) -> ShadeError {
    ShadeError::InvalidAggregate {
        message,
        help: None,
    }
}
