//! Render configuration (shade.yaml) parsing.
//!
//! Holds default shading, spreading and output options for the CLI.
//! Command-line flags take precedence over these values.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadeError};
use crate::render::{CompositeOp, How, Origin, ShadeOptions, Span};
use crate::render::{DEFAULT_MAX_PX, DEFAULT_THRESHOLD};
use crate::types::{ColorKey, Colormap, Colour, KernelShape};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "shade.yaml";

/// A colormap as written in YAML: one token or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CmapConfig {
    One(String),
    Many(Vec<String>),
}

/// A color key as written in YAML: a list or a label mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorKeyConfig {
    List(Vec<String>),
    Map(HashMap<String, String>),
}

/// Dynamic spreading settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DynspreadConfig {
    pub threshold: f64,
    pub max_px: i32,
}

impl Default for DynspreadConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_px: DEFAULT_MAX_PX,
        }
    }
}

/// Render configuration loaded from shade.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Colormap for 2-D data.
    pub cmap: Option<CmapConfig>,

    /// Category colours.
    pub color_key: Option<ColorKeyConfig>,

    /// Interpolation method name.
    pub how: Option<String>,

    /// Fixed value range as `[lo, hi]`.
    pub span: Option<[f64; 2]>,

    pub alpha: Option<u8>,

    pub min_alpha: Option<u8>,

    /// Fixed spread radius.
    pub spread: Option<i32>,

    pub dynspread: Option<DynspreadConfig>,

    /// Kernel shape for spreading ("circle" or "square").
    pub shape: Option<String>,

    /// Compositing operator for spreading ("over" or "add").
    pub composite: Option<String>,

    /// Background colour token.
    pub background: Option<String>,

    /// Integer scale factor for PNG output.
    pub scale: Option<u32>,

    /// Bitmap origin ("lower" or "upper").
    pub origin: Option<String>,
}

impl RenderConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ShadeError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ShadeError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some("Check shade.yaml syntax".to_string()),
        })
    }

    /// Resolve the shading options.
    pub fn shade_options(&self) -> Result<ShadeOptions> {
        let mut opts = ShadeOptions::default();

        match &self.cmap {
            Some(CmapConfig::One(token)) => opts.cmap = Colormap::single(token.clone()),
            Some(CmapConfig::Many(tokens)) => opts.cmap = Colormap::List(tokens.clone()),
            None => {}
        }

        opts.color_key = self.color_key.as_ref().map(|key| match key {
            ColorKeyConfig::List(tokens) => ColorKey::List(tokens.clone()),
            ColorKeyConfig::Map(map) => ColorKey::Map(map.clone()),
        });

        if let Some(how) = &self.how {
            opts.how = how.parse::<How>()?;
        }
        if let Some([lo, hi]) = self.span {
            opts.span = Some(Span::new(lo, hi)?);
        }
        if let Some(alpha) = self.alpha {
            opts.alpha = alpha;
        }
        if let Some(min_alpha) = self.min_alpha {
            opts.min_alpha = min_alpha;
        }

        Ok(opts)
    }

    pub fn kernel_shape(&self) -> Result<KernelShape> {
        self.shape
            .as_deref()
            .map_or(Ok(KernelShape::default()), str::parse)
    }

    pub fn composite_op(&self) -> Result<CompositeOp> {
        self.composite
            .as_deref()
            .map_or(Ok(CompositeOp::default()), str::parse)
    }

    pub fn background(&self) -> Result<Option<Colour>> {
        self.background.as_deref().map(Colour::parse).transpose()
    }

    pub fn origin(&self) -> Result<Origin> {
        self.origin
            .as_deref()
            .map_or(Ok(Origin::default()), str::parse)
    }

    /// Get the effective scale factor.
    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r##"
cmap: ["pink", "red"]
how: linear
span: [0, 10]
alpha: 200
min_alpha: 20
dynspread:
  threshold: 0.75
shape: square
composite: add
background: "#000000"
scale: 2
origin: upper
"##;
        let config = RenderConfig::parse(yaml).unwrap();
        let opts = config.shade_options().unwrap();
        assert!(matches!(opts.how, How::Linear));
        assert_eq!(opts.span, Some(Span::new(0.0, 10.0).unwrap()));
        assert_eq!(opts.alpha, 200);
        assert_eq!(opts.min_alpha, 20);
        assert_eq!(
            config.dynspread,
            Some(DynspreadConfig {
                threshold: 0.75,
                max_px: 3
            })
        );
        assert_eq!(config.kernel_shape().unwrap(), KernelShape::Square);
        assert_eq!(config.composite_op().unwrap(), CompositeOp::Add);
        assert_eq!(config.background().unwrap(), Some(Colour::BLACK));
        assert_eq!(config.origin().unwrap(), Origin::Upper);
        assert_eq!(config.effective_scale(), 2);
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::parse("{}").unwrap();
        let opts = config.shade_options().unwrap();
        assert!(matches!(opts.how, How::Log));
        assert_eq!(opts.min_alpha, 40);
        assert_eq!(config.kernel_shape().unwrap(), KernelShape::Circle);
        assert_eq!(config.background().unwrap(), None);
        assert_eq!(config.effective_scale(), 1);
    }

    #[test]
    fn test_single_cmap_and_color_key_map() {
        let yaml = "cmap: black\ncolor_key:\n  a: red\n  b: blue\n";
        let opts = RenderConfig::parse(yaml).unwrap().shade_options().unwrap();
        assert!(matches!(opts.cmap, Colormap::Single(ref t) if t == "black"));
        assert!(matches!(opts.color_key, Some(ColorKey::Map(ref m)) if m.len() == 2));
    }

    #[test]
    fn test_invalid_values() {
        assert!(RenderConfig::parse("unknown_key: 1").is_err());
        assert!(RenderConfig::parse("how: cubic")
            .unwrap()
            .shade_options()
            .is_err());
        assert!(RenderConfig::parse("span: [5, 1]")
            .unwrap()
            .shade_options()
            .is_err());
        assert!(RenderConfig::parse("alpha: 300").is_err());
    }
}
