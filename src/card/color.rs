// Hex color values for the card palette
//
// The generative service returns colors as strings. We accept the two forms
// it actually produces (#RGB and #RRGGBB) and normalize to lowercase #rrggbb
// so the renderer can append alpha and the TUI can convert to RGB.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated, normalized `#rrggbb` color
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex color string
    /// Supports:
    /// - Short form: #RGB
    /// - Long form: #RRGGBB
    ///
    /// Returns None for anything else (named colors, rgb(), missing '#').
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return None,
        };

        Some(Self(format!("#{}", expanded.to_ascii_lowercase())))
    }

    /// The normalized `#rrggbb` string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green, blue components
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.0[1..];
        // Normalized on construction, so every pair is valid hex
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a hex color: {:?}", value))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        let color = HexColor::parse("#1A2B3C").unwrap();
        assert_eq!(color.as_str(), "#1a2b3c");
        assert_eq!(color.rgb(), (0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn test_parse_short_form_expands() {
        let color = HexColor::parse("#fa0").unwrap();
        assert_eq!(color.as_str(), "#ffaa00");
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(HexColor::parse("red").is_none());
        assert!(HexColor::parse("1a2b3c").is_none());
        assert!(HexColor::parse("#12345").is_none());
        assert!(HexColor::parse("#gg0000").is_none());
        assert!(HexColor::parse("#1a2b3c80").is_none());
        assert!(HexColor::parse("").is_none());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(HexColor::parse("  #ABCDEF ").unwrap().as_str(), "#abcdef");
    }
}
