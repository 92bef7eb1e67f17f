//! Raw bulb telemetry.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::types::{Color, Hsv, LightMode, PowerMode};

/// The last property bundle successfully fetched from a bulb.
///
/// Bulbs report numbers either as JSON numbers or as numeric strings; both
/// forms deserialize.
///
/// # Examples
///
/// ```
/// use yeelight_bridge::RawPropertySnapshot;
///
/// let snapshot: RawPropertySnapshot = serde_json::from_value(serde_json::json!({
///     "power": "on", "bright": "80", "color_mode": 1, "rgb": "16711680",
///     "hue": 0, "sat": 0, "ct": 4000,
/// })).unwrap();
/// assert!(snapshot.power.is_on());
/// assert_eq!(snapshot.bright, 80);
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPropertySnapshot {
    pub power: PowerMode,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub bright: u8,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub color_mode: u8,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub rgb: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub hue: u16,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub sat: u8,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ct: u16,
}

impl Default for RawPropertySnapshot {
    fn default() -> Self {
        RawPropertySnapshot {
            power: PowerMode::Off,
            bright: 100,
            color_mode: LightMode::ColorTemperature.into(),
            rgb: 0xFFFFFF,
            hue: 0,
            sat: 0,
            ct: 4000,
        }
    }
}

impl RawPropertySnapshot {
    pub fn light_mode(&self) -> LightMode {
        LightMode::from(self.color_mode)
    }

    pub fn hsv(&self) -> Hsv {
        Hsv::new(self.hue, self.sat, self.bright)
    }

    /// The color the bulb is emitting, or black in color temperature mode.
    pub fn color(&self) -> Color {
        match self.light_mode() {
            LightMode::Rgb => Color::from_packed(self.rgb),
            LightMode::Hsv => self.hsv().to_color(),
            LightMode::ColorTemperature | LightMode::Unknown(_) => Color::new(),
        }
    }

    /// Overwrite the fields present in `update`, keeping the rest.
    pub fn merge(&mut self, update: &PropertyUpdate) {
        if let Some(power) = update.power {
            self.power = power;
        }
        if let Some(bright) = update.bright {
            self.bright = bright;
        }
        if let Some(color_mode) = update.color_mode {
            self.color_mode = color_mode;
        }
        if let Some(rgb) = update.rgb {
            self.rgb = rgb;
        }
        if let Some(hue) = update.hue {
            self.hue = hue;
        }
        if let Some(sat) = update.sat {
            self.sat = sat;
        }
        if let Some(ct) = update.ct {
            self.ct = ct;
        }
    }
}

/// A partial property bundle, as pushed by a bulb in a `props` notification.
///
/// Keys the snapshot does not track are ignored.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyUpdate {
    pub power: Option<PowerMode>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub bright: Option<u8>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub color_mode: Option<u8>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub rgb: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub hue: Option<u16>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub sat: Option<u8>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub ct: Option<u16>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PropertyUpdate::default()
    }
}
