//! Image compositing.

use std::fmt;
use std::str::FromStr;

use ndarray::Zip;
use tracing::debug;

use crate::error::{Result, ShadeError};
use crate::types::Colour;

use super::Image;

/// How two pixels are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Alpha compositing of `src` over `dst`.
    #[default]
    Over,
    /// Additive blending, saturating at 255.
    Add,
}

impl CompositeOp {
    /// Combine `src` drawn onto `dst`.
    pub fn apply(self, src: u32, dst: u32) -> u32 {
        match self {
            CompositeOp::Over => over(src, dst),
            CompositeOp::Add => add(src, dst),
        }
    }
}

impl FromStr for CompositeOp {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "over" => Ok(CompositeOp::Over),
            "add" => Ok(CompositeOp::Add),
            other => Err(ShadeError::Parse {
                message: format!("Unknown compositing operator: {}", other),
                help: Some("Use 'over' or 'add'".to_string()),
            }),
        }
    }
}

impl fmt::Display for CompositeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeOp::Over => write!(f, "over"),
            CompositeOp::Add => write!(f, "add"),
        }
    }
}

/// Channels of a packed pixel scaled to [0, 1], as (r, g, b, a).
fn channels(pixel: u32) -> [f64; 4] {
    pixel.to_le_bytes().map(|b| b as f64 / 255.0)
}

/// Re-quantize [0, 1] channels by truncation, saturating at 255.
fn pack(r: f64, g: f64, b: f64, a: f64) -> u32 {
    let q = |x: f64| ((x * 255.0) as u32).min(255) as u8;
    u32::from_le_bytes([q(r), q(g), q(b), q(a)])
}

/// Porter-Duff `src` over `dst`.
pub fn over(src: u32, dst: u32) -> u32 {
    let [rs, gs, bs, sa] = channels(src);
    let [rd, gd, bd, da] = channels(dst);

    let a = sa + da * (1.0 - sa);
    if a == 0.0 {
        return 0;
    }

    let mix = |cs: f64, cd: f64| (cs * sa + cd * da * (1.0 - sa)) / a;
    pack(mix(rs, rd), mix(gs, gd), mix(bs, bd), a)
}

/// Additive blend of `src` and `dst`. Commutative.
pub fn add(src: u32, dst: u32) -> u32 {
    let [rs, gs, bs, sa] = channels(src);
    let [rd, gd, bd, da] = channels(dst);

    let a = (sa + da).min(1.0);
    if a == 0.0 {
        return 0;
    }

    let mix = |cs: f64, cd: f64| (cs * sa + cd * da) / a;
    pack(mix(rs, rd), mix(gs, gd), mix(bs, bd), a)
}

/// Combine images in argument order; each later image is drawn onto the
/// accumulated result.
///
/// All images must share the same coordinates.
pub fn stack(images: &[&Image], how: CompositeOp) -> Result<Image> {
    let Some((first, rest)) = images.split_first() else {
        return Err(ShadeError::ShapeMismatch {
            message: "no images to stack".to_string(),
        });
    };

    if let Some(other) = rest.iter().find(|img| img.coords() != first.coords()) {
        let (h0, w0) = first.dim();
        let (h1, w1) = other.dim();
        return Err(ShadeError::ShapeMismatch {
            message: format!(
                "cannot stack a {}x{} image with a {}x{} image on different coordinates",
                h0, w0, h1, w1
            ),
        });
    }

    debug!(count = images.len(), op = %how, "stacking images");

    let mut acc = first.pixels().clone();
    for img in rest {
        Zip::from(&mut acc)
            .and(img.pixels())
            .par_for_each(|dst, &src| *dst = how.apply(src, *dst));
    }
    Ok(first.with_pixels(acc))
}

/// Flatten `image` onto an opaque background. `None` returns a copy.
pub fn set_background(image: &Image, colour: Option<Colour>) -> Image {
    let Some(colour) = colour else {
        return image.clone();
    };

    let background = colour.with_alpha(255).to_packed();
    image.with_pixels(image.pixels().mapv(|p| over(p, background)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_transparent_cases() {
        assert_eq!(over(0, 0), 0);
        assert_eq!(over(0xff0000ff, 0), 0xff0000ff);
        assert_eq!(over(0, 0xff00ff00), 0xff00ff00);
    }

    #[test]
    fn test_over_opaque_src_wins() {
        assert_eq!(over(0xff0000ff, 0xffff0000), 0xff0000ff);
    }

    #[test]
    fn test_add_commutes_and_saturates() {
        let (a, b) = (0xff00ff7d, 0x7d7d7dff);
        assert_eq!(add(a, b), add(b, a));
        assert_eq!(add(0xffffffff, 0xffffffff), 0xffffffff);
        assert_eq!(add(0, 0), 0);
    }

    #[test]
    fn test_op_from_str() {
        assert_eq!("over".parse::<CompositeOp>().unwrap(), CompositeOp::Over);
        assert_eq!("ADD".parse::<CompositeOp>().unwrap(), CompositeOp::Add);
        assert!("multiply".parse::<CompositeOp>().is_err());
    }

    #[test]
    fn test_stack_empty_is_error() {
        assert!(matches!(
            stack(&[], CompositeOp::Over),
            Err(ShadeError::ShapeMismatch { .. })
        ));
    }
}
