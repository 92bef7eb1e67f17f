//! Bridge configuration and per-model bulb specs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};

use crate::types::KelvinRange;

/// Runtime settings shared by every bridged bulb.
///
/// Durations are expressed in (fractional) seconds when deserialized.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use yeelight_bridge::BridgeConfig;
///
/// let config: BridgeConfig = serde_json::from_str(r#"{"poll_interval": 2.5}"#).unwrap();
/// assert_eq!(config.poll_interval, Duration::from_millis(2500));
/// assert_eq!(config.pairing_timeout, Duration::from_secs(3));
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Delay between two reconciliation cycles. Values below
    /// [`BridgeConfig::MIN_POLL_INTERVAL`] are raised to it.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub poll_interval: Duration,
    /// Upper bound on a single bulb call. `None` relies on the transport alone.
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub command_timeout: Option<Duration>,
    /// How long one discovery scan may run.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub pairing_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            command_timeout: Some(Self::DEFAULT_COMMAND_TIMEOUT),
            pairing_timeout: Self::DEFAULT_PAIRING_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_PAIRING_TIMEOUT: Duration = Duration::from_secs(3);
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// The poll interval the loop actually waits for.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(Self::MIN_POLL_INTERVAL)
    }
}

/// Hardware facts about a bulb model that discovery does not advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub kelvin_range: KelvinRange,
    pub night_light: bool,
    pub background_light: bool,
}

impl ModelSpec {
    const fn new(min: u16, max: u16, night_light: bool, background_light: bool) -> Self {
        ModelSpec {
            kelvin_range: KelvinRange::new(min, max),
            night_light,
            background_light,
        }
    }

    /// Look up a model by the name the bulb reports (e.g. `"color1"`).
    pub fn for_model(model: &str) -> Option<Self> {
        let spec = match model {
            "mono" | "mono1" => Self::new(2700, 2700, false, false),
            "color" | "color1" | "strip1" | "bslamp1" => Self::new(1700, 6500, false, false),
            "bslamp2" => Self::new(1700, 6500, true, false),
            "ceiling1" | "ceiling2" | "ceiling3" | "ceiling13" => Self::new(2700, 6500, true, false),
            "ceiling4" => Self::new(2700, 6500, true, true),
            "color2" => Self::new(2700, 6500, false, false),
            _ => return None,
        };
        Some(spec)
    }

    /// Color temperature range for a model, falling back to
    /// [`KelvinRange::DEFAULT`] when the model is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::{KelvinRange, ModelSpec};
    ///
    /// assert_eq!(ModelSpec::kelvin_range_for("ceiling4"), KelvinRange::new(2700, 6500));
    /// assert_eq!(ModelSpec::kelvin_range_for("lamp9"), KelvinRange::DEFAULT);
    /// ```
    pub fn kelvin_range_for(model: &str) -> KelvinRange {
        Self::for_model(model)
            .map(|spec| spec.kelvin_range)
            .unwrap_or_default()
    }
}
