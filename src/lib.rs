//! rastershade - Transfer functions for aggregated data grids
//!
//! A library for turning dense, pre-binned 2-D (or categorical 3-D) grids
//! into RGBA images: normalization and colorization, compositing,
//! spreading of sparse pixels, and histogram equalization.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod render;
pub mod types;

pub use config::RenderConfig;
pub use error::{Result, ShadeError};
pub use loader::{load_aggregate, parse_aggregate};
pub use render::{
    add, density, dynspread, eq_hist, eq_hist_int, normalize, over, read_png, set_background,
    shade, spread, spread_with_kernel, stack, write_png, CompositeOp, How, Image, Origin,
    ShadeOptions, Span,
};
pub use types::{
    AggregateData, Axis, ColorKey, ColorSpec, Colormap, Colour, CoordValues, Coords, KernelShape,
    Palette, RawAggregate, StructuringKernel, Values, Weights,
};
