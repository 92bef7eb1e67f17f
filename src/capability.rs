//! Commands a bulb advertises support for.

use std::collections::HashSet;
use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumString};

/// A command name from the bulb's `support` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    GetProp,
    SetDefault,
    SetPower,
    Toggle,
    SetBright,
    SetRgb,
    SetHsv,
    SetCtAbx,
    StartCf,
    StopCf,
    SetScene,
    CronAdd,
    CronGet,
    CronDel,
    SetAdjust,
    SetMusic,
    SetName,
}

/// The set of commands one bulb supports. Fixed for the bulb's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulbCapabilities {
    supported: HashSet<Capability>,
}

impl BulbCapabilities {
    /// Parse a space-separated support list as advertised during discovery.
    ///
    /// Unknown command names are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::BulbCapabilities;
    ///
    /// let caps = BulbCapabilities::from_support("get_prop set_power set_bright set_rgb set_hsv");
    /// assert!(caps.is_dimmable());
    /// assert!(caps.is_color());
    /// assert!(!caps.is_variable_color_temp());
    /// ```
    pub fn from_support(support: &str) -> Self {
        support
            .split_whitespace()
            .filter_map(|name| Capability::from_str(name).ok())
            .collect()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.supported.contains(&capability)
    }

    pub fn is_dimmable(&self) -> bool {
        self.supports(Capability::SetBright)
    }

    /// Color needs both RGB and HSV support.
    pub fn is_color(&self) -> bool {
        self.supports(Capability::SetRgb) && self.supports(Capability::SetHsv)
    }

    pub fn is_variable_color_temp(&self) -> bool {
        self.supports(Capability::SetCtAbx)
    }
}

impl FromIterator<Capability> for BulbCapabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        BulbCapabilities {
            supported: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_requires_rgb_and_hsv() {
        assert!(!BulbCapabilities::from_support("set_rgb").is_color());
        assert!(!BulbCapabilities::from_support("set_hsv").is_color());
        assert!(BulbCapabilities::from_support("set_hsv set_rgb").is_color());
    }

    #[test]
    fn test_unknown_commands_ignored() {
        let caps = BulbCapabilities::from_support("bg_set_rgb  set_ct_abx dev_toggle");
        assert!(caps.is_variable_color_temp());
        assert!(!caps.is_color());
        assert!(!caps.is_dimmable());
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::SetCtAbx.as_ref(), "set_ct_abx");
        assert_eq!(Capability::from_str("set_bright").unwrap(), Capability::SetBright);
    }
}
