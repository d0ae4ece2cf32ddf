//! Transfer functions for rastershade.
//!
//! This module turns aggregates into images and images into new images:
//! normalizing and colorizing, compositing, spreading, and PNG output.

mod colorize;
mod composite;
mod eq_hist;
mod image;
mod normalize;
mod png;
mod shade;
mod spread;

pub use self::image::{Image, Origin};
pub use composite::{add, over, set_background, stack, CompositeOp};
pub use eq_hist::{eq_hist, eq_hist_int, eq_hist_with_bins, DEFAULT_NBINS};
pub use normalize::{normalize, CustomTransform, How, Span};
pub use png::{read_png, scale_bitmap, write_png, write_png_with_origin};
pub use shade::{shade, ShadeOptions, DEFAULT_ALPHA, DEFAULT_MIN_ALPHA};
pub use spread::{
    density, dynspread, spread, spread_with_kernel, DEFAULT_MAX_PX, DEFAULT_THRESHOLD,
};
