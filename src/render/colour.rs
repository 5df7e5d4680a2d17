//! Colour helpers and the per-block style derived from a primary colour.

use serde::{Deserialize, Serialize};

/// Colour given to blocks whose definition does not set one.
pub const DEFAULT_COLOUR: &str = "#a55b5b";

const HSV_SATURATION: f64 = 0.45;
const HSV_VALUE: f64 = 0.65;

/// Converts a hue in degrees to a hex colour using the block palette's saturation and value.
pub fn hue_to_hex(hue: f64) -> String {
    let hue = hue.rem_euclid(360.0);
    let chroma = HSV_VALUE * HSV_SATURATION;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = HSV_VALUE - chroma;
    to_hex([(r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0])
}

/// Parses `#rrggbb` or `#rgb`.
pub fn parse_hex(colour: &str) -> Option<[f64; 3]> {
    let hex = colour.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok().map(f64::from);
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn to_hex(rgb: [f64; 3]) -> String {
    let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Mixes `first` into `second`; a factor of 1 yields `first`, 0 yields `second`.
/// Returns `None` if either colour is not valid hex.
pub fn blend(first: &str, second: &str, factor: f64) -> Option<String> {
    let a = parse_hex(first)?;
    let b = parse_hex(second)?;
    let factor = factor.clamp(0.0, 1.0);
    Some(to_hex([
        b[0] + factor * (a[0] - b[0]),
        b[1] + factor * (a[1] - b[1]),
        b[2] + factor * (a[2] - b[2]),
    ]))
}

/// Fill and stroke colours for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStyle {
    pub colour_primary: String,
    pub colour_secondary: String,
    pub colour_tertiary: String,
}

impl BlockStyle {
    /// Derives the lighter secondary and darker tertiary colours from the primary one.
    /// An unparseable colour falls back to [`DEFAULT_COLOUR`].
    pub fn from_colour(colour: &str) -> Self {
        let primary = if parse_hex(colour).is_some() {
            colour.to_lowercase()
        } else {
            DEFAULT_COLOUR.to_string()
        };
        let secondary = blend("#ffffff", &primary, 0.6).unwrap_or_else(|| primary.clone());
        let tertiary = blend("#000000", &primary, 0.3).unwrap_or_else(|| primary.clone());
        Self {
            colour_primary: primary,
            colour_secondary: secondary,
            colour_tertiary: tertiary,
        }
    }
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self::from_colour(DEFAULT_COLOUR)
    }
}
