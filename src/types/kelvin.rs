//! Color temperature.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Kelvin {
    pub fn new(kelvin: u16) -> Self {
        Kelvin { kelvin }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }
}

/// Inclusive color temperature range supported by a bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KelvinRange {
    pub min: u16,
    pub max: u16,
}

impl Default for KelvinRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl KelvinRange {
    /// Range assumed for bulbs whose model is not in the model table.
    pub const DEFAULT: KelvinRange = KelvinRange {
        min: 1700,
        max: 6500,
    };

    pub const fn new(min: u16, max: u16) -> Self {
        KelvinRange { min, max }
    }

    /// Clamp an arbitrary integer into this range.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::KelvinRange;
    ///
    /// let range = KelvinRange::DEFAULT;
    /// assert_eq!(range.clamp(10_000).kelvin(), 6500);
    /// assert_eq!(range.clamp(-3).kelvin(), 1700);
    /// assert_eq!(range.clamp(4000).kelvin(), 4000);
    /// ```
    pub fn clamp(&self, kelvin: i64) -> Kelvin {
        Kelvin::new(kelvin.clamp(i64::from(self.min), i64::from(self.max)) as u16)
    }
}
