//! Colormap arguments and their resolved form.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ShadeError};

use super::{Colour, Palette};

/// A continuous colormap: maps a normalized value in [0, 1] to a colour.
pub type ColourFn = Arc<dyn Fn(f64) -> Colour + Send + Sync>;

/// Colormap argument for 2-D aggregates, as supplied by the caller.
#[derive(Clone)]
pub enum Colormap {
    /// One colour token. Shades with a dynamic alpha.
    Single(String),
    /// Evenly spaced ramp stops.
    List(Vec<String>),
    /// A function of the normalized value.
    Continuous(ColourFn),
}

impl Colormap {
    pub fn single(token: impl Into<String>) -> Self {
        Colormap::Single(token.into())
    }

    pub fn list<S: AsRef<str>>(tokens: &[S]) -> Self {
        Colormap::List(tokens.iter().map(|t| t.as_ref().to_string()).collect())
    }

    pub fn continuous<F>(f: F) -> Self
    where
        F: Fn(f64) -> Colour + Send + Sync + 'static,
    {
        Colormap::Continuous(Arc::new(f))
    }

    /// Resolve into a validated colour spec.
    pub fn resolve(&self) -> Result<ColorSpec> {
        match self {
            Colormap::Single(token) => Ok(ColorSpec::Single(Colour::parse(token)?)),
            Colormap::List(tokens) => {
                let colours = tokens
                    .iter()
                    .map(|t| Colour::parse(t))
                    .collect::<Result<Vec<_>>>()?;
                match colours.as_slice() {
                    [] => Err(ShadeError::InvalidColormap {
                        message: "colormap is empty".to_string(),
                        help: Some("Provide at least one colour".to_string()),
                    }),
                    [only] => Ok(ColorSpec::Ramp(vec![*only, *only])),
                    _ => Ok(ColorSpec::Ramp(colours)),
                }
            }
            Colormap::Continuous(f) => Ok(ColorSpec::Continuous(Arc::clone(f))),
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::list(&super::palettes::DEFAULT_RAMP)
    }
}

impl fmt::Debug for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colormap::Single(t) => f.debug_tuple("Single").field(t).finish(),
            Colormap::List(t) => f.debug_tuple("List").field(t).finish(),
            Colormap::Continuous(_) => f.write_str("Continuous(..)"),
        }
    }
}

impl From<&str> for Colormap {
    fn from(token: &str) -> Self {
        Colormap::single(token)
    }
}

impl From<Vec<&str>> for Colormap {
    fn from(tokens: Vec<&str>) -> Self {
        Colormap::list(tokens.as_slice())
    }
}

impl From<Vec<String>> for Colormap {
    fn from(tokens: Vec<String>) -> Self {
        Colormap::List(tokens)
    }
}

/// Colour assignment for categorical aggregates.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorKey {
    /// Zipped with the category labels in axis order.
    List(Vec<String>),
    /// Looked up by category label.
    Map(HashMap<String, String>),
}

impl ColorKey {
    pub fn list<S: AsRef<str>>(tokens: &[S]) -> Self {
        ColorKey::List(tokens.iter().map(|t| t.as_ref().to_string()).collect())
    }

    /// Resolve one colour per category, in category order.
    pub fn resolve(&self, categories: &[String]) -> Result<ColorSpec> {
        let colours = match self {
            ColorKey::List(tokens) => {
                if tokens.len() < categories.len() {
                    return Err(ShadeError::InvalidColormap {
                        message: format!(
                            "{} colours for {} categories",
                            tokens.len(),
                            categories.len()
                        ),
                        help: Some("Provide at least one colour per category".to_string()),
                    });
                }
                tokens
                    .iter()
                    .take(categories.len())
                    .map(|t| Colour::parse(t))
                    .collect::<Result<Vec<_>>>()?
            }
            ColorKey::Map(map) => categories
                .iter()
                .map(|cat| {
                    let token = map.get(cat).ok_or_else(|| ShadeError::InvalidColormap {
                        message: format!("no colour for category '{}'", cat),
                        help: Some("Every category in the data needs a key entry".to_string()),
                    })?;
                    Colour::parse(token)
                })
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(ColorSpec::Category(colours))
    }
}

/// Resolve category colours, falling back to the default categorical palette.
pub fn resolve_category_colours(
    key: Option<&ColorKey>,
    categories: &[String],
) -> Result<ColorSpec> {
    if let Some(key) = key {
        return key.resolve(categories);
    }

    let palette = Palette::default();
    if palette.len() < categories.len() {
        return Err(ShadeError::InvalidColormap {
            message: format!(
                "{} categories but the default palette has {} colours",
                categories.len(),
                palette.len()
            ),
            help: Some("Supply a color key".to_string()),
        });
    }
    Ok(ColorSpec::Category(palette.colours()[..categories.len()].to_vec()))
}

/// A resolved, validated colour specification.
///
/// `Ramp`, `Single` and `Continuous` come from a [`Colormap`] and shade 2-D
/// grids; `Category` comes from a [`ColorKey`] or the default palette and
/// shades categorical aggregates.
#[derive(Clone)]
pub enum ColorSpec {
    /// At least two stops.
    Ramp(Vec<Colour>),
    Single(Colour),
    Continuous(ColourFn),
    /// One colour per category, in axis order.
    Category(Vec<Colour>),
}

impl fmt::Debug for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::Ramp(c) => f.debug_tuple("Ramp").field(c).finish(),
            ColorSpec::Single(c) => f.debug_tuple("Single").field(c).finish(),
            ColorSpec::Continuous(_) => f.write_str("Continuous(..)"),
            ColorSpec::Category(c) => f.debug_tuple("Category").field(c).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn category_colours(spec: ColorSpec) -> Vec<Colour> {
        match spec {
            ColorSpec::Category(colours) => colours,
            other => panic!("expected category colours, got {:?}", other),
        }
    }

    #[test]
    fn test_single_element_list_becomes_flat_ramp() {
        let spec = Colormap::list(&["red"]).resolve().unwrap();
        match spec {
            ColorSpec::Ramp(stops) => assert_eq!(stops, vec![Colour::rgb(255, 0, 0); 2]),
            other => panic!("expected ramp, got {:?}", other),
        }
    }

    #[test]
    fn test_single_token_is_single() {
        let spec = Colormap::from("black").resolve().unwrap();
        assert!(matches!(spec, ColorSpec::Single(c) if c == Colour::BLACK));
    }

    #[test]
    fn test_invalid_colormaps() {
        assert!(Colormap::List(vec![]).resolve().is_err());
        assert!(Colormap::list(&["red", "notacolour"]).resolve().is_err());
        assert!(Colormap::single("").resolve().is_err());
    }

    #[test]
    fn test_default_ramp() {
        match Colormap::default().resolve().unwrap() {
            ColorSpec::Ramp(stops) => {
                assert_eq!(stops, vec![Colour::rgb(173, 216, 230), Colour::rgb(0, 0, 139)]);
            }
            other => panic!("expected ramp, got {:?}", other),
        }
    }

    #[test]
    fn test_color_key_list_and_map() {
        let cats = labels(&["a", "b"]);
        let key = ColorKey::list(&["red", "#0000FF", "green"]);
        assert_eq!(
            category_colours(key.resolve(&cats).unwrap()),
            vec![Colour::rgb(255, 0, 0), Colour::rgb(0, 0, 255)]
        );

        assert!(ColorKey::list(&["red"]).resolve(&cats).is_err());

        let mut map = HashMap::new();
        map.insert("a".to_string(), "red".to_string());
        assert!(ColorKey::Map(map.clone()).resolve(&cats).is_err());
        map.insert("b".to_string(), "blue".to_string());
        assert_eq!(
            category_colours(ColorKey::Map(map).resolve(&cats).unwrap())[1],
            Colour::rgb(0, 0, 255)
        );
    }

    #[test]
    fn test_default_category_colours() {
        let cats = labels(&["a", "b", "c"]);
        let colours = category_colours(resolve_category_colours(None, &cats).unwrap());
        assert_eq!(colours[0], Colour::rgb(0xe4, 0x1a, 0x1c));
        assert_eq!(colours.len(), 3);

        let many: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        assert!(resolve_category_colours(None, &many).is_err());
    }
}
