//! Inspect command implementation.
//!
//! Prints size, coverage and density of a PNG to stdout.

use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::render::{density, read_png, Image, Origin};

/// Report size, coverage and density of a PNG
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Image to inspect
    pub image: PathBuf,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let image = read_png(&args.image, Origin::Upper)?;
    print!("{}", report(&image));
    Ok(())
}

fn report(image: &Image) -> String {
    let total = image.width() * image.height();
    let visible = image.count_visible();
    let d = density(image.pixels());

    let mut out = String::new();
    out.push_str(&format!("size:    {}x{}\n", image.width(), image.height()));
    out.push_str(&format!("visible: {} of {}\n", visible, total));
    if d.is_finite() {
        out.push_str(&format!("density: {:.4}\n", d));
    } else {
        out.push_str("density: inf\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_report() {
        let mut pixels = Array2::<u32>::zeros((3, 4));
        pixels[[1, 1]] = 0xff0000ff;
        pixels[[1, 2]] = 0xff0000ff;
        let text = report(&Image::from_pixels(pixels));
        assert_eq!(text, "size:    4x3\nvisible: 2 of 12\ndensity: 0.1250\n");
    }

    #[test]
    fn test_report_empty() {
        let text = report(&Image::from_pixels(Array2::zeros((2, 2))));
        assert!(text.ends_with("density: inf\n"));
    }
}
