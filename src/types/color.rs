//! RGB color representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// An RGB color with red, green, and blue components (0-255 each).
///
/// Displays as an uppercase `#RRGGBB` hex string, which is also the form the
/// framework uses for color properties.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use yeelight_bridge::Color;
///
/// let color = Color::from_str("#1a2b3c").unwrap();
/// assert_eq!(color.to_string(), "#1A2B3C");
/// assert_eq!(color.red(), 0x1A);
/// ```
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a default color (black: 0,0,0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpack a `0xRRGGBB` integer as reported by the bulb.
    ///
    /// Bits above the low 24 are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::Color;
    ///
    /// assert_eq!(Color::from_packed(0xFF8000), Color::rgb(255, 128, 0));
    /// ```
    pub fn from_packed(rgb: u32) -> Self {
        Self {
            red: ((rgb >> 16) & 0xFF) as u8,
            green: ((rgb >> 8) & 0xFF) as u8,
            blue: (rgb & 0xFF) as u8,
        }
    }

    /// Pack into a `0xRRGGBB` integer.
    pub fn packed(&self) -> u32 {
        (u32::from(self.red) << 16) | (u32::from(self.green) << 8) | u32::from(self.blue)
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse from a `#RRGGBB` hex string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidColorString(s.to_string());

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let color = Color::from_str("#1A2B3C").unwrap();
        assert_eq!(color, Color::rgb(0x1A, 0x2B, 0x3C));
        assert_eq!(color.to_string(), "#1A2B3C");
    }

    #[test]
    fn test_display_zero_padded() {
        assert_eq!(Color::from_packed(0x00000F).to_string(), "#00000F");
        assert_eq!(Color::new().to_string(), "#000000");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["1A2B3C", "#1A2B3", "#1A2B3CD", "#GGGGGG", "", "#"] {
            assert_eq!(
                Color::from_str(bad),
                Err(Error::InvalidColorString(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_packed_ignores_high_bits() {
        let color = Color::from_packed(0x0112_3456);
        assert_eq!(color.packed(), 0x12_3456);
    }
}
