//! Shaded image value object.
//!
//! An `Image` owns a grid of packed pixels plus the coordinates of the
//! aggregate (or first operand) it came from.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use ndarray::Array2;

use crate::error::{Result, ShadeError};
use crate::types::{Colour, Coords};

/// Which bitmap row holds the first grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Grid row 0 is the bottom of the bitmap (y increases upward).
    #[default]
    Lower,
    /// Grid row 0 is the top of the bitmap.
    Upper,
}

impl FromStr for Origin {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lower" => Ok(Origin::Lower),
            "upper" => Ok(Origin::Upper),
            other => Err(ShadeError::Parse {
                message: format!("Unknown origin: {}", other),
                help: Some("Use 'lower' or 'upper'".to_string()),
            }),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Lower => write!(f, "lower"),
            Origin::Upper => write!(f, "upper"),
        }
    }
}

/// A grid of packed RGBA pixels with coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Pixel grid (row-major: pixels[[y, x]]).
    pixels: Array2<u32>,

    coords: Coords,
}

impl Image {
    /// Create an image. The coordinates must match the grid shape.
    pub fn new(pixels: Array2<u32>, coords: Coords) -> Result<Self> {
        if coords.shape() != pixels.dim() {
            return Err(ShadeError::ShapeMismatch {
                message: format!(
                    "coordinates are {}x{} but pixels are {}x{}",
                    coords.y.len(),
                    coords.x.len(),
                    pixels.nrows(),
                    pixels.ncols()
                ),
            });
        }
        Ok(Self { pixels, coords })
    }

    /// Create an image with index coordinates.
    pub fn from_pixels(pixels: Array2<u32>) -> Self {
        let (height, width) = pixels.dim();
        Self {
            pixels,
            coords: Coords::index(height, width),
        }
    }

    /// Replace the pixels, keeping these coordinates.
    pub(crate) fn with_pixels(&self, pixels: Array2<u32>) -> Self {
        Self {
            pixels,
            coords: self.coords.clone(),
        }
    }

    /// Get the width in pixels.
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// Get the height in pixels.
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Grid shape as (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Get a pixel at the given position.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        self.pixels.get([y, x]).map(|&p| Colour::from_packed(p))
    }

    pub fn pixels(&self) -> &Array2<u32> {
        &self.pixels
    }

    pub fn into_pixels(self) -> Array2<u32> {
        self.pixels
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    /// Number of pixels with nonzero alpha.
    pub fn count_visible(&self) -> usize {
        self.pixels.iter().filter(|&&p| p >> 24 != 0).count()
    }

    /// Convert to a bitmap with the lower origin.
    pub fn to_bitmap(&self) -> RgbaImage {
        self.to_bitmap_with_origin(Origin::Lower)
    }

    /// Convert to a bitmap.
    pub fn to_bitmap_with_origin(&self, origin: Origin) -> RgbaImage {
        let (height, width) = self.dim();
        ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            let row = match origin {
                Origin::Lower => height - 1 - y as usize,
                Origin::Upper => y as usize,
            };
            Rgba(self.pixels[[row, x as usize]].to_le_bytes())
        })
    }

    /// Build an image from a bitmap, with index coordinates.
    pub fn from_bitmap(bitmap: &RgbaImage, origin: Origin) -> Self {
        let (width, height) = (bitmap.width() as usize, bitmap.height() as usize);
        let pixels = Array2::from_shape_fn((height, width), |(row, x)| {
            let y = match origin {
                Origin::Lower => height - 1 - row,
                Origin::Upper => row,
            };
            u32::from_le_bytes(bitmap.get_pixel(x as u32, y as u32).0)
        });
        Self::from_pixels(pixels)
    }

    /// Encode as PNG. The returned cursor is positioned at the start.
    pub fn to_bytes(&self) -> Result<Cursor<Vec<u8>>> {
        let mut cursor = Cursor::new(Vec::new());
        self.to_bitmap()
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ShadeError::Encode {
                message: format!("Failed to encode PNG: {}", e),
            })?;
        cursor.set_position(0);
        Ok(cursor)
    }
}
