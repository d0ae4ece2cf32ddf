//! Built-in colour tables.
//!
//! Named colours come from the SVG/CSS table shipped with the `palette`
//! crate. The categorical palettes are ColorBrewer's qualitative sets.

use super::Colour;

/// ColorBrewer Set1.
pub const SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

/// ColorBrewer Set2.
pub const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// ColorBrewer Set3.
pub const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// Default two-stop ramp for 2-D aggregates.
pub const DEFAULT_RAMP: [&str; 2] = ["lightblue", "darkblue"];

/// Look up a CSS colour name (case-insensitive).
pub fn named(name: &str) -> Option<Colour> {
    let name = name.trim().to_ascii_lowercase();
    palette::named::from_str(&name).map(|c| Colour::rgb(c.red, c.green, c.blue))
}

/// An ordered list of colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Palette name
    pub name: String,

    colours: Vec<Colour>,
}

impl Palette {
    /// Create a new palette from already-resolved colours.
    pub fn new(name: impl Into<String>, colours: Vec<Colour>) -> Self {
        Self {
            name: name.into(),
            colours,
        }
    }

    /// Set1, Set2 and Set3 concatenated: the default categorical key.
    pub fn sets1to3() -> Self {
        let colours = SET1
            .iter()
            .chain(SET2.iter())
            .chain(SET3.iter())
            .filter_map(|hex| Colour::from_hex(hex).ok())
            .collect();
        Self::new("sets1to3", colours)
    }

    /// Get the colour at `index`.
    pub fn get(&self, index: usize) -> Option<Colour> {
        self.colours.get(index).copied()
    }

    /// All colours in order.
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// Get the number of colours.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Check if the palette is empty.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::sets1to3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        assert_eq!(named("pink"), Some(Colour::rgb(255, 192, 203)));
        assert_eq!(named("ORANGE"), Some(Colour::rgb(255, 165, 0)));
        assert_eq!(named("lightblue"), Some(Colour::rgb(173, 216, 230)));
        assert_eq!(named("foo"), None);
    }

    #[test]
    fn test_sets1to3() {
        let palette = Palette::sets1to3();
        assert_eq!(palette.len(), 29);
        assert_eq!(palette.get(0), Some(Colour::rgb(0xe4, 0x1a, 0x1c)));
        assert_eq!(palette.get(9), Some(Colour::rgb(0x66, 0xc2, 0xa5)));
        assert_eq!(palette.get(29), None);
    }

    #[test]
    fn test_default_ramp_resolves() {
        for name in DEFAULT_RAMP {
            assert!(named(name).is_some(), "{} should be a named colour", name);
        }
    }
}
