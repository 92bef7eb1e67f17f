//! Brightness level.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 100 percent.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Clamps any integer into 0-100.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(-5).value(), 0);
    /// assert_eq!(Brightness::clamped(42).value(), 42);
    /// assert_eq!(Brightness::clamped(250).value(), 100);
    /// ```
    pub fn clamped(value: i64) -> Self {
        Brightness {
            value: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8,
        }
    }
}
