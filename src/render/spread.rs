//! Spreading of sparse pixels.
//!
//! `spread` stamps a kernel around every visible pixel. `dynspread` grows
//! the kernel until the image is dense enough.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::error::{Result, ShadeError};
use crate::types::{KernelShape, StructuringKernel};

use super::{CompositeOp, Image};

/// Default density target for [`dynspread`].
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default largest radius tried by [`dynspread`].
pub const DEFAULT_MAX_PX: i32 = 3;

/// Spread each visible pixel over a kernel.
///
/// When `mask` is given it is the kernel (both dimensions must be odd) and
/// `px` only has to be non-negative. Otherwise a `shape` kernel of radius
/// `px` is built.
pub fn spread(
    image: &Image,
    px: i32,
    shape: KernelShape,
    how: CompositeOp,
    mask: Option<&Array2<bool>>,
) -> Result<Image> {
    if px < 0 {
        return Err(ShadeError::InvalidSpread {
            message: format!("spread radius must be non-negative, got {}", px),
            help: None,
        });
    }

    let kernel = match mask {
        Some(mask) => StructuringKernel::from_mask(mask.clone())?,
        None => StructuringKernel::new(shape, px as usize),
    };
    Ok(spread_with_kernel(image, &kernel, how))
}

/// Spread each visible pixel over `kernel`.
///
/// Contributions to an output pixel are combined in row-major order of
/// their source pixels.
pub fn spread_with_kernel(image: &Image, kernel: &StructuringKernel, how: CompositeOp) -> Image {
    if kernel.is_identity() {
        return image.clone();
    }

    let src = image.pixels();
    let (height, width) = src.dim();
    let (kh, kw) = kernel.dim();
    let (ey, ex) = kernel.centre();
    let footprint = kernel.mask();

    let out = Zip::indexed(src).par_map_collect(|(oy, ox), _| {
        let mut acc = 0u32;
        // Source (sy, sx) reaches (oy, ox) through kernel cell
        // (oy - sy + ey, ox - sx + ex).
        let sy_lo = (oy + ey + 1).saturating_sub(kh);
        let sy_hi = (oy + ey).min(height - 1);
        let sx_lo = (ox + ex + 1).saturating_sub(kw);
        let sx_hi = (ox + ex).min(width - 1);

        for sy in sy_lo..=sy_hi {
            for sx in sx_lo..=sx_hi {
                let pixel = src[[sy, sx]];
                if pixel == 0 {
                    continue;
                }
                if footprint[[oy + ey - sy, ox + ex - sx]] {
                    acc = how.apply(pixel, acc);
                }
            }
        }
        acc
    });

    image.with_pixels(out)
}

/// Mean fraction of occupied neighbours around visible interior pixels.
///
/// Only pixels away from the border are counted. Returns +inf when there
/// are none, 1.0 when every one is fully surrounded and 0.0 when all are
/// isolated.
pub fn density(pixels: &Array2<u32>) -> f64 {
    let (height, width) = pixels.dim();
    let visible = |y: usize, x: usize| pixels[[y, x]] >> 24 != 0;

    let mut count = 0u64;
    let mut neighbourhood = 0u64;
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if !visible(y, x) {
                continue;
            }
            count += 1;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    if visible(ny, nx) {
                        neighbourhood += 1;
                    }
                }
            }
        }
    }

    if count == 0 {
        return f64::INFINITY;
    }
    (neighbourhood - count) as f64 / (count * 8) as f64
}

/// Spread by the smallest radius that reaches `threshold` density.
///
/// Radii `0..=max_px` are tried in turn; the `max_px` spread is returned
/// if none is dense enough.
pub fn dynspread(
    image: &Image,
    threshold: f64,
    max_px: i32,
    shape: KernelShape,
    how: CompositeOp,
) -> Result<Image> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ShadeError::InvalidThreshold {
            message: format!("threshold must be between 0 and 1, got {}", threshold),
        });
    }
    if max_px < 0 {
        return Err(ShadeError::InvalidThreshold {
            message: format!("max_px must be non-negative, got {}", max_px),
        });
    }

    let mut out = image.clone();
    for px in 0..=max_px {
        out = spread(image, px, shape, how, None)?;
        let d = density(out.pixels());
        if d >= threshold {
            debug!(px, density = d, threshold, "dynspread reached threshold");
            return Ok(out);
        }
    }

    debug!(px = max_px, threshold, "dynspread stopped at max_px");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_density_sentinels() {
        assert_eq!(density(&Array2::zeros((4, 4))), f64::INFINITY);
        assert_eq!(density(&Array2::from_elem((4, 4), 0xff000000)), 1.0);

        let mut isolated = Array2::<u32>::zeros((5, 5));
        isolated[[1, 1]] = 0xff000000;
        isolated[[3, 3]] = 0xff000000;
        assert_eq!(density(&isolated), 0.0);
    }

    #[test]
    fn test_density_ignores_border_pixels() {
        let mut img = Array2::<u32>::zeros((3, 3));
        img[[0, 0]] = 0xff000000;
        assert_eq!(density(&img), f64::INFINITY);
    }

    #[test]
    fn test_spread_zero_is_copy() {
        let img = Image::from_pixels(array![[0u32, 0x7d00007d], [0xff00ff00, 0]]);
        let out = spread(&img, 0, KernelShape::Circle, CompositeOp::Over, None).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_spread_rejects_bad_input() {
        let img = Image::from_pixels(Array2::zeros((3, 3)));
        assert!(spread(&img, -1, KernelShape::Circle, CompositeOp::Over, None).is_err());
        let even = Array2::from_elem((2, 2), true);
        assert!(matches!(
            spread(&img, 1, KernelShape::Circle, CompositeOp::Over, Some(&even)),
            Err(ShadeError::InvalidSpread { .. })
        ));
    }

    #[test]
    fn test_spread_fills_footprint() {
        let mut pixels = Array2::<u32>::zeros((3, 3));
        pixels[[1, 1]] = 0xff0000ff;
        let img = Image::from_pixels(pixels);
        let out = spread(&img, 1, KernelShape::Square, CompositeOp::Over, None).unwrap();
        assert!(out.pixels().iter().all(|&p| p == 0xff0000ff));
    }

    #[test]
    fn test_dynspread_validation() {
        let img = Image::from_pixels(Array2::zeros((3, 3)));
        let shape = KernelShape::Circle;
        let op = CompositeOp::Over;
        assert!(dynspread(&img, 1.1, 3, shape, op).is_err());
        assert!(dynspread(&img, -0.1, 3, shape, op).is_err());
        assert!(dynspread(&img, f64::NAN, 3, shape, op).is_err());
        assert!(matches!(
            dynspread(&img, 0.5, -1, shape, op),
            Err(ShadeError::InvalidThreshold { .. })
        ));
    }
}
