//! PNG file output and input.
//!
//! Writes images to PNG files with optional integer scaling.

use std::path::Path;

use image::{ImageBuffer, RgbaImage};

use crate::error::{Result, ShadeError};

use super::{Image, Origin};

/// Write an image to a PNG file with the lower origin.
///
/// # Arguments
///
/// * `image` - The image to write
/// * `path` - Output file path
/// * `scale` - Integer scale factor (1 = no scaling)
pub fn write_png(image: &Image, path: &Path, scale: u32) -> Result<()> {
    write_png_with_origin(image, path, scale, Origin::Lower)
}

/// Write an image to a PNG file.
pub fn write_png_with_origin(image: &Image, path: &Path, scale: u32, origin: Origin) -> Result<()> {
    let bitmap = scale_bitmap(&image.to_bitmap_with_origin(origin), scale);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    bitmap.save(path).map_err(|e| ShadeError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(())
}

/// Read a PNG file into an image with index coordinates.
pub fn read_png(path: &Path, origin: Origin) -> Result<Image> {
    let bitmap = image::open(path)
        .map_err(|e| ShadeError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read image: {}", e),
        })?
        .to_rgba8();
    Ok(Image::from_bitmap(&bitmap, origin))
}

/// Scale a bitmap by an integer factor.
///
/// Uses nearest-neighbour scaling so pixels stay crisp.
pub fn scale_bitmap(bitmap: &RgbaImage, scale: u32) -> RgbaImage {
    let scale = scale.max(1); // Minimum scale of 1
    if scale == 1 {
        return bitmap.clone();
    }

    ImageBuffer::from_fn(bitmap.width() * scale, bitmap.height() * scale, |x, y| {
        *bitmap.get_pixel(x / scale, y / scale)
    })
}
