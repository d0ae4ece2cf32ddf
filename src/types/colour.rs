//! Colour type, colour-token parsing and pixel packing.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShadeError};

use super::palettes;

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour. Packs to the canonical missing pixel `0`.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse any accepted colour token.
    ///
    /// Accepts CSS colour names (`"pink"`), hex strings (`"#FF0000"`,
    /// `"#F00"`, `"FF0000"`) and RGB triples (`"(0, 255, 0)"` or `"0,255,0"`).
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ShadeError::InvalidColormap {
                message: "empty colour token".to_string(),
                help: None,
            });
        }

        if token.contains(',') {
            return Self::from_triple(token);
        }

        if token.starts_with('#') {
            return Self::from_hex(token);
        }

        if let Some(colour) = palettes::named(token) {
            return Ok(colour);
        }

        // Bare RRGGBB(AA) without the leading '#'
        if matches!(token.len(), 6 | 8) && token.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_hex(token);
        }

        Err(ShadeError::InvalidColormap {
            message: format!("Unknown colour: {}", token),
            help: Some("Use a CSS colour name, #RRGGBB, or an (r, g, b) triple".to_string()),
        })
    }

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (3 digits, expanded to 6)
    /// - `#RGBA` (4 digits, expanded to 8)
    /// - `#RRGGBB` (6 digits)
    /// - `#RRGGBBAA` (8 digits)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid_hex(s));
        }

        match hex.len() {
            3 | 4 => {
                // #RGB(A) -> #RRGGBB(AA)
                let mut nibbles = [15u8; 4];
                for (slot, c) in nibbles.iter_mut().zip(hex.chars()) {
                    *slot = parse_hex_digit(c)?;
                }
                let [r, g, b, a] = nibbles.map(|n| n << 4 | n);
                Ok(Self::new(r, g, b, a))
            }
            6 | 8 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                let a = if hex.len() == 8 {
                    parse_hex_byte(&hex[6..8])?
                } else {
                    255
                };
                Ok(Self::new(r, g, b, a))
            }
            _ => Err(invalid_hex(s)),
        }
    }

    /// Parse an `(r, g, b)` triple.
    fn from_triple(s: &str) -> Result<Self> {
        let inner = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');

        let channels: Vec<&str> = inner.split(',').map(str::trim).collect();
        if channels.len() != 3 {
            return Err(ShadeError::InvalidColormap {
                message: format!("Invalid RGB triple: {}", s),
                help: Some("Use three comma-separated channels, e.g. (255, 0, 0)".to_string()),
            });
        }

        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(&channels) {
            *slot = channel.parse().map_err(|_| ShadeError::InvalidColormap {
                message: format!("Invalid RGB channel '{}' in {}", channel, s),
                help: Some("Channels must be integers between 0 and 255".to_string()),
            })?;
        }

        Ok(Self::rgb(rgb[0], rgb[1], rgb[2]))
    }

    /// Convert to RGBA tuple.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same colour with a different alpha channel.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Pack into a 32-bit pixel (`A << 24 | B << 16 | G << 8 | R`).
    pub const fn to_packed(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack a 32-bit pixel.
    pub const fn from_packed(pixel: u32) -> Self {
        let [r, g, b, a] = pixel.to_le_bytes();
        Self::new(r, g, b, a)
    }

    /// Check if the colour is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Check if the colour is fully opaque.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl FromStr for Colour {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u8, u8, u8)> for Colour {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

fn invalid_hex(s: &str) -> ShadeError {
    ShadeError::InvalidColormap {
        message: format!("Invalid hex colour: {}", s),
        help: Some("Use #RGB, #RGBA, #RRGGBB, or #RRGGBBAA format".to_string()),
    }
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| ShadeError::InvalidColormap {
            message: format!("Invalid hex digit: {}", c),
            help: None,
        })
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| ShadeError::InvalidColormap {
        message: format!("Invalid hex byte: {}", s),
        help: None,
    })
}
