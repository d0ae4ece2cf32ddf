//! Core domain types for rastershade.
//!
//! - `Colour` - RGBA colour values and packed pixels
//! - `Palette` - Built-in colour tables
//! - `Colormap` / `ColorKey` / `ColorSpec` - Colour arguments and their resolved form
//! - `RawAggregate` - Aggregated input grids
//! - `StructuringKernel` - Footprints for spreading

mod aggregate;
mod colormap;
mod colour;
mod kernel;
pub mod palettes;

pub use aggregate::{AggregateData, Axis, CoordValues, Coords, RawAggregate, Values, Weights};
pub use colormap::{resolve_category_colours, ColorKey, ColorSpec, Colormap, ColourFn};
pub use colour::Colour;
pub use kernel::{KernelShape, StructuringKernel};
pub use palettes::Palette;
