//! Shade command implementation.
//!
//! Loads an aggregate, shades it, optionally spreads and flattens it, and
//! writes a PNG.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{CmapConfig, DynspreadConfig, RenderConfig, CONFIG_FILE};
use crate::error::{Result, ShadeError};
use crate::loader::load_aggregate;
use crate::output::{display_path, Printer};
use crate::render::{dynspread, set_background, shade, spread, write_png_with_origin};

/// Shade an aggregate (JSON) into a PNG
#[derive(Args, Debug)]
pub struct ShadeArgs {
    /// Aggregate file (JSON)
    pub input: PathBuf,

    /// Output PNG (defaults to the input path with a .png extension)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Render configuration file (defaults to ./shade.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Colour token; repeat for a ramp
    #[arg(long)]
    pub cmap: Vec<String>,

    /// Interpolation: linear, log, cbrt or eq_hist
    #[arg(long)]
    pub how: Option<String>,

    /// Fixed value range
    #[arg(long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    pub span: Option<Vec<f64>>,

    /// Alpha of valid pixels
    #[arg(long)]
    pub alpha: Option<u8>,

    /// Lowest alpha for single-colour and categorical shading
    #[arg(long)]
    pub min_alpha: Option<u8>,

    /// Spread every pixel by a fixed radius
    #[arg(long, conflicts_with = "dynspread")]
    pub spread: Option<i32>,

    /// Spread adaptively until the density threshold is reached
    #[arg(long)]
    pub dynspread: bool,

    /// Density threshold for --dynspread
    #[arg(long, requires = "dynspread")]
    pub threshold: Option<f64>,

    /// Largest radius tried by --dynspread
    #[arg(long, requires = "dynspread")]
    pub max_px: Option<i32>,

    /// Kernel shape: circle or square
    #[arg(long)]
    pub shape: Option<String>,

    /// Compositing for overlapping spreads: over or add
    #[arg(long)]
    pub composite: Option<String>,

    /// Flatten onto this background colour
    #[arg(long)]
    pub background: Option<String>,

    /// Scale factor for output (integer upscaling)
    #[arg(long)]
    pub scale: Option<u32>,

    /// Bitmap origin: lower or upper
    #[arg(long)]
    pub origin: Option<String>,
}

pub fn run(args: ShadeArgs) -> Result<()> {
    let printer = Printer::new();
    let config = resolve_config(&args)?;

    let opts = config.shade_options()?;
    let shape = config.kernel_shape()?;
    let how = config.composite_op()?;
    let background = config.background()?;
    let origin = config.origin()?;

    let agg = load_aggregate(&args.input)?;
    let (height, width) = agg.dim();
    printer.status(
        "Shading",
        &format!(
            "{} {}",
            display_path(&args.input),
            printer.dim(&format!("({}x{}, {})", width, height, opts.how))
        ),
    );

    let mut image = shade(&agg, &opts)?;

    if let Some(px) = config.spread {
        printer.info("Spreading", &format!("{} px ({}, {})", px, shape, how));
        image = spread(&image, px, shape, how, None)?;
    } else if let Some(dyn_cfg) = config.dynspread {
        printer.info(
            "Spreading",
            &format!(
                "up to {} px to density {} ({}, {})",
                dyn_cfg.max_px, dyn_cfg.threshold, shape, how
            ),
        );
        image = dynspread(&image, dyn_cfg.threshold, dyn_cfg.max_px, shape, how)?;
    }

    if image.count_visible() == 0 {
        printer.warning("Empty", "no valid cells; the image is fully transparent");
    }

    if background.is_some() {
        image = set_background(&image, background);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("png"));
    write_png_with_origin(&image, &output, config.effective_scale(), origin)?;

    printer.status("Finished", &printer.cyan(&display_path(&output)));
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(args: &ShadeArgs) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None if Path::new(CONFIG_FILE).exists() => RenderConfig::load(Path::new(CONFIG_FILE))?,
        None => RenderConfig::default(),
    };

    match args.cmap.as_slice() {
        [] => {}
        [one] => config.cmap = Some(CmapConfig::One(one.clone())),
        many => config.cmap = Some(CmapConfig::Many(many.to_vec())),
    }

    if let Some(span) = &args.span {
        let [lo, hi] = span.as_slice() else {
            return Err(ShadeError::InvalidSpan {
                message: format!("expected two span values, got {}", span.len()),
                help: None,
            });
        };
        config.span = Some([*lo, *hi]);
    }

    if args.spread.is_some() {
        config.spread = args.spread;
        config.dynspread = None;
    }

    if args.dynspread {
        let mut dyn_cfg = config.dynspread.unwrap_or_default();
        if let Some(threshold) = args.threshold {
            dyn_cfg.threshold = threshold;
        }
        if let Some(max_px) = args.max_px {
            dyn_cfg.max_px = max_px;
        }
        config.spread = None;
        config.dynspread = Some(dyn_cfg);
    }

    override_with(&mut config.how, &args.how);
    override_with(&mut config.alpha, &args.alpha);
    override_with(&mut config.min_alpha, &args.min_alpha);
    override_with(&mut config.shape, &args.shape);
    override_with(&mut config.composite, &args.composite);
    override_with(&mut config.background, &args.background);
    override_with(&mut config.scale, &args.scale);
    override_with(&mut config.origin, &args.origin);

    Ok(config)
}

fn override_with<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    use crate::cli::{Cli, Commands};

    fn parse(argv: &[&str]) -> ShadeArgs {
        match Cli::parse_from(argv).command {
            Commands::Shade(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("shade.yaml");
        fs::write(&config_path, "how: linear\nspread: 2\nscale: 3\n").unwrap();

        let args = parse(&[
            "rastershade",
            "shade",
            "in.json",
            "--config",
            config_path.to_str().unwrap(),
            "--how",
            "cbrt",
            "--dynspread",
            "--threshold",
            "0.9",
            "--cmap",
            "pink",
            "--cmap",
            "red",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.how.as_deref(), Some("cbrt"));
        assert_eq!(config.spread, None);
        assert_eq!(
            config.dynspread,
            Some(DynspreadConfig {
                threshold: 0.9,
                max_px: 3
            })
        );
        assert_eq!(config.scale, Some(3));
        assert_eq!(
            config.cmap,
            Some(CmapConfig::Many(vec!["pink".to_string(), "red".to_string()]))
        );
    }

    #[test]
    fn test_run_writes_png() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("counts.json");
        fs::write(&input, r#"{"dtype": "int", "data": [[0, 1, 2], [3, 4, 0]]}"#).unwrap();
        let output = dir.path().join("out.png");

        let args = parse(&[
            "rastershade",
            "shade",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--spread",
            "1",
            "--background",
            "black",
        ]);
        run(args).unwrap();

        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }
}
