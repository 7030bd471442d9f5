//! Shape colors and the shared palette
//!
//! Colors travel as hex strings on the wire (`"#RRGGBB"` / `"#RRGGBBAA"`) so
//! the persisted JSON matches what the browser adapter writes into SVG.

use serde::{Deserialize, Serialize};

// =============================================================================
// Color Types
// =============================================================================

/// Color representation for shape fills, borders and text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ShapeColor {
    /// Create an opaque RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create an RGBA color
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: ShapeColor = ShapeColor::rgb(0, 0, 0);
    pub const WHITE: ShapeColor = ShapeColor::rgb(255, 255, 255);
    pub const DARK_GRAY: ShapeColor = ShapeColor::rgb(51, 51, 51);
    pub const SLATE: ShapeColor = ShapeColor::rgb(102, 102, 102);

    /// Convert to hex string (e.g., "#RRGGBB" or "#RRGGBBAA")
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse from hex string, with or without the leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<ShapeColor> for String {
    fn from(color: ShapeColor) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for ShapeColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ShapeColor::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

// =============================================================================
// Palette
// =============================================================================

/// The shared palette new shapes draw their colors from.
///
/// Heading shapes are tinted by heading level (1..=4); manual shapes use a
/// neutral fill. Border and text colors are shared by both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub heading_levels: [ShapeColor; 4],
    pub manual: ShapeColor,
    pub border: ShapeColor,
    pub text: ShapeColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            heading_levels: [
                ShapeColor::rgb(0xE3, 0xF2, 0xFD),
                ShapeColor::rgb(0xE8, 0xF5, 0xE9),
                ShapeColor::rgb(0xFF, 0xF3, 0xE0),
                ShapeColor::rgb(0xF3, 0xE5, 0xF5),
            ],
            manual: ShapeColor::WHITE,
            border: ShapeColor::SLATE,
            text: ShapeColor::DARK_GRAY,
        }
    }
}

impl Palette {
    /// Fill color for a heading of the given level; out-of-range levels are clamped
    pub fn heading_fill(&self, level: u8) -> ShapeColor {
        let index = usize::from(level.clamp(1, 4)) - 1;
        self.heading_levels[index]
    }
}
