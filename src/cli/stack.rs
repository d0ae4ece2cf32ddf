//! Stack command implementation.
//!
//! Composites PNG images in argument order and writes the result.

use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::render::{read_png, stack, write_png_with_origin, CompositeOp, Image, Origin};

/// Composite PNG images into one
#[derive(Args, Debug)]
pub struct StackArgs {
    /// Input images, bottom first
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Output PNG
    #[arg(long, short)]
    pub output: PathBuf,

    /// Compositing operator: over or add
    #[arg(long, default_value = "over")]
    pub how: CompositeOp,

    /// Bitmap origin: lower or upper
    #[arg(long, default_value = "lower")]
    pub origin: Origin,
}

pub fn run(args: StackArgs) -> Result<()> {
    let printer = Printer::new();

    let images = args
        .images
        .iter()
        .map(|path| read_png(path, args.origin))
        .collect::<Result<Vec<Image>>>()?;

    printer.status(
        "Stacking",
        &format!(
            "{} {}",
            plural(images.len(), "image", "images"),
            printer.dim(&format!("({})", args.how))
        ),
    );

    let refs: Vec<&Image> = images.iter().collect();
    let stacked = stack(&refs, args.how)?;
    write_png_with_origin(&stacked, &args.output, 1, args.origin)?;

    printer.status("Finished", &printer.cyan(&display_path(&args.output)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    use crate::error::ShadeError;
    use crate::render::write_png;

    #[test]
    fn test_stack_files() {
        let dir = tempdir().unwrap();
        let bottom = dir.path().join("bottom.png");
        let top = dir.path().join("top.png");
        let output = dir.path().join("out.png");

        write_png(&Image::from_pixels(array![[0xff0000ffu32, 0]]), &bottom, 1).unwrap();
        write_png(&Image::from_pixels(array![[0u32, 0xff00ff00]]), &top, 1).unwrap();

        run(StackArgs {
            images: vec![bottom, top],
            output: output.clone(),
            how: CompositeOp::Over,
            origin: Origin::Lower,
        })
        .unwrap();

        let result = read_png(&output, Origin::Lower).unwrap();
        assert_eq!(result.pixels(), &array![[0xff0000ffu32, 0xff00ff00]]);
    }

    #[test]
    fn test_stack_size_mismatch() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        write_png(&Image::from_pixels(array![[0xff0000ffu32]]), &a, 1).unwrap();
        write_png(&Image::from_pixels(array![[0xff0000ffu32, 0]]), &b, 1).unwrap();

        let err = run(StackArgs {
            images: vec![a, b],
            output: dir.path().join("out.png"),
            how: CompositeOp::Add,
            origin: Origin::Lower,
        })
        .unwrap_err();
        assert!(matches!(err, ShadeError::ShapeMismatch { .. }));
    }
}
