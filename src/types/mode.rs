//! Bulb light modes and the generic color mode derived from them.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The bulb's raw `color_mode` indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    Rgb,
    ColorTemperature,
    Hsv,
    Unknown(u8),
}

impl From<u8> for LightMode {
    fn from(raw: u8) -> Self {
        match raw {
            1 => LightMode::Rgb,
            2 => LightMode::ColorTemperature,
            3 => LightMode::Hsv,
            other => LightMode::Unknown(other),
        }
    }
}

impl From<LightMode> for u8 {
    fn from(mode: LightMode) -> Self {
        match mode {
            LightMode::Rgb => 1,
            LightMode::ColorTemperature => 2,
            LightMode::Hsv => 3,
            LightMode::Unknown(raw) => raw,
        }
    }
}

/// Which channel the light is currently driven by, as the framework sees it.
///
/// RGB and HSV both report as `color`; only the explicit color temperature
/// mode yields `temperature`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorMode {
    Color,
    Temperature,
}

impl From<LightMode> for ColorMode {
    fn from(mode: LightMode) -> Self {
        match mode {
            LightMode::ColorTemperature => ColorMode::Temperature,
            _ => ColorMode::Color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_color_mode_from_light_mode() {
        assert_eq!(ColorMode::from(LightMode::from(1)), ColorMode::Color);
        assert_eq!(ColorMode::from(LightMode::from(2)), ColorMode::Temperature);
        assert_eq!(ColorMode::from(LightMode::from(3)), ColorMode::Color);
        assert_eq!(ColorMode::from(LightMode::from(7)), ColorMode::Color);
    }

    #[test]
    fn test_color_mode_names() {
        assert_eq!(ColorMode::Temperature.to_string(), "temperature");
        assert_eq!(ColorMode::from_str("color").unwrap(), ColorMode::Color);
    }
}
