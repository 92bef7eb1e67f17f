//! Framework-facing properties and their read/write paths.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::cache::DeviceStateCache;
use crate::capability::BulbCapabilities;
use crate::host::Notifier;
use crate::snapshot::RawPropertySnapshot;
use crate::transport::{BulbCommand, BulbTransport};
use crate::types::{Brightness, Color, ColorMode, Kelvin, KelvinRange, PowerMode};

/// A property value as exchanged with the framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integers, and numbers rounded to the nearest integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            PropertyValue::Number(n) if n.is_finite() => Some(n.round() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{b}"),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<Color> for PropertyValue {
    fn from(color: Color) -> Self {
        PropertyValue::String(color.to_string())
    }
}

impl From<ColorMode> for PropertyValue {
    fn from(mode: ColorMode) -> Self {
        PropertyValue::String(mode.to_string())
    }
}

/// JSON data type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Integer,
    String,
}

/// Property metadata handed to the framework.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    #[serde(rename = "@type")]
    pub semantic_type: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub unit: Option<&'static str>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    pub read_only: Option<bool>,
}

impl PropertySchema {
    fn new(semantic_type: &'static str, title: &'static str, data_type: DataType) -> Self {
        PropertySchema {
            semantic_type,
            title,
            data_type,
            unit: None,
            minimum: None,
            maximum: None,
            enum_values: None,
            read_only: None,
        }
    }

    fn bounded(mut self, unit: &'static str, minimum: i64, maximum: i64) -> Self {
        self.unit = Some(unit);
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Clamp into `[minimum, maximum]`, leaving unbounded sides open.
    pub fn clamp(&self, value: i64) -> i64 {
        let value = self.minimum.map_or(value, |min| value.max(min));
        self.maximum.map_or(value, |max| value.min(max))
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }
}

/// The generic properties a bulb can expose, in exposure order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum PropertyKind {
    Color,
    ColorTemperature,
    ColorMode,
    Level,
    On,
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether a bulb with these capabilities exposes this property.
    pub fn is_exposed(&self, caps: &BulbCapabilities) -> bool {
        match self {
            PropertyKind::On => true,
            PropertyKind::Level => caps.is_dimmable(),
            PropertyKind::Color => caps.is_color(),
            PropertyKind::ColorTemperature => caps.is_variable_color_temp(),
            PropertyKind::ColorMode => caps.is_color() && caps.is_variable_color_temp(),
        }
    }

    pub fn schema(&self, kelvin_range: KelvinRange) -> PropertySchema {
        match self {
            PropertyKind::On => PropertySchema::new("OnOffProperty", "On/Off", DataType::Boolean),
            PropertyKind::Level => {
                PropertySchema::new("BrightnessProperty", "Brightness", DataType::Integer)
                    .bounded(
                        "percent",
                        i64::from(Brightness::MIN),
                        i64::from(Brightness::MAX),
                    )
            }
            PropertyKind::Color => PropertySchema::new("ColorProperty", "Color", DataType::String),
            PropertyKind::ColorTemperature => PropertySchema::new(
                "ColorTemperatureProperty",
                "Color Temperature",
                DataType::Integer,
            )
            .bounded(
                "kelvin",
                i64::from(kelvin_range.min),
                i64::from(kelvin_range.max),
            ),
            PropertyKind::ColorMode => PropertySchema {
                enum_values: Some(vec![
                    ColorMode::Color.to_string(),
                    ColorMode::Temperature.to_string(),
                ]),
                read_only: Some(true),
                ..PropertySchema::new("ColorModeProperty", "Color Mode", DataType::String)
            },
        }
    }

    /// The framework value of this property for a given bulb snapshot.
    pub fn derive(&self, snapshot: &RawPropertySnapshot, kelvin_range: KelvinRange) -> PropertyValue {
        match self {
            PropertyKind::On => snapshot.power.is_on().into(),
            PropertyKind::Level => {
                i64::from(Brightness::clamped(i64::from(snapshot.bright)).value()).into()
            }
            PropertyKind::Color => snapshot.color().into(),
            PropertyKind::ColorTemperature => {
                i64::from(kelvin_range.clamp(i64::from(snapshot.ct)).kelvin()).into()
            }
            PropertyKind::ColorMode => ColorMode::from(snapshot.light_mode()).into(),
        }
    }

    /// Turn a requested value into a bulb write, clamping numbers into the
    /// schema bounds. Returns `None` when the value cannot be written.
    pub fn validate(&self, value: &PropertyValue, schema: &PropertySchema) -> Option<PropertyWrite> {
        match self {
            PropertyKind::On => value.as_bool().map(|on| PropertyWrite::On(PowerMode::from(on))),
            PropertyKind::Level => value
                .as_integer()
                .map(|level| PropertyWrite::Level(Brightness::clamped(schema.clamp(level)))),
            PropertyKind::Color => value
                .as_str()
                .and_then(|s| Color::from_str(s).ok())
                .map(PropertyWrite::Color),
            PropertyKind::ColorTemperature => value.as_integer().map(|kelvin| {
                let kelvin = schema.clamp(kelvin).clamp(0, i64::from(u16::MAX));
                PropertyWrite::ColorTemperature(Kelvin::new(kelvin as u16))
            }),
            PropertyKind::ColorMode => None,
        }
    }

    /// Whether a derived-state event concerns this property.
    pub fn consumes(&self, event: &StateEvent) -> bool {
        matches!(
            (self, event),
            (PropertyKind::ColorMode, StateEvent::ColorModeChanged(_))
        )
    }
}

/// A validated write, ready to be sent to the bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyWrite {
    On(PowerMode),
    Level(Brightness),
    Color(Color),
    ColorTemperature(Kelvin),
}

impl PropertyWrite {
    pub fn command(&self) -> BulbCommand {
        match *self {
            PropertyWrite::On(power) => BulbCommand::Power(power),
            PropertyWrite::Level(brightness) => BulbCommand::Brightness(brightness),
            PropertyWrite::Color(color) => BulbCommand::Rgb(color),
            PropertyWrite::ColorTemperature(kelvin) => BulbCommand::ColorTemperature(kelvin),
        }
    }

    /// Power writes go through whatever the bulb's state; the rest are
    /// dropped while it is off.
    pub fn requires_power(&self) -> bool {
        !matches!(self, PropertyWrite::On(_))
    }

    /// The value cached once the bulb accepted the write.
    pub fn value(&self) -> PropertyValue {
        match *self {
            PropertyWrite::On(power) => power.is_on().into(),
            PropertyWrite::Level(brightness) => i64::from(brightness.value()).into(),
            PropertyWrite::Color(color) => color.into(),
            PropertyWrite::ColorTemperature(kelvin) => i64::from(kelvin.kelvin()).into(),
        }
    }

    /// The derived-state change a successful write implies for other
    /// properties.
    pub fn event(&self) -> Option<StateEvent> {
        match self {
            PropertyWrite::Color(_) => Some(StateEvent::ColorModeChanged(ColorMode::Color)),
            PropertyWrite::ColorTemperature(_) => {
                Some(StateEvent::ColorModeChanged(ColorMode::Temperature))
            }
            PropertyWrite::On(_) | PropertyWrite::Level(_) => None,
        }
    }
}

/// Derived state published by a write to a primary property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    ColorModeChanged(ColorMode),
}

impl StateEvent {
    fn value(&self) -> PropertyValue {
        match *self {
            StateEvent::ColorModeChanged(mode) => mode.into(),
        }
    }
}

/// What became of a property write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The bulb accepted the write and the value was cached and announced.
    Applied {
        value: PropertyValue,
        event: Option<StateEvent>,
    },
    /// The bulb is off, so only power writes are honoured.
    BulbOff,
    /// The value is not writable for this property.
    Rejected,
    /// The bulb could not be reached; nothing changed.
    Failed,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }
}

/// One framework property of a bulb.
///
/// Holds the last announced value. Storing a new value and announcing it
/// happen under the same lock, so observers never see one without the other.
#[derive(Debug)]
pub struct Property {
    kind: PropertyKind,
    schema: PropertySchema,
    value: Mutex<PropertyValue>,
}

impl Property {
    pub fn new(kind: PropertyKind, kelvin_range: KelvinRange, value: PropertyValue) -> Self {
        Property {
            kind,
            schema: kind.schema(kelvin_range),
            value: Mutex::new(value),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn value(&self) -> PropertyValue {
        self.lock().clone()
    }

    /// Write-through path: validate, refresh, send to the bulb, then cache
    /// and announce.
    ///
    /// Nothing is cached or announced unless the bulb accepted the command.
    /// The derived-state event of an accepted write is handed to `dependents`
    /// before this property announces its own value.
    pub async fn set_value<T: BulbTransport>(
        &self,
        requested: &PropertyValue,
        cache: &DeviceStateCache<T>,
        dependents: &[Property],
    ) -> WriteOutcome {
        let notifier = cache.notifier();
        if self.schema.is_read_only() {
            warn!("{}: {} is read-only", notifier.device_id(), self.name());
            return WriteOutcome::Rejected;
        }
        let Some(write) = self.kind.validate(requested, &self.schema) else {
            warn!(
                "{}: rejected {} for {}",
                notifier.device_id(),
                requested,
                self.name()
            );
            return WriteOutcome::Rejected;
        };

        // A failed refresh leaves the last known power state in place.
        let _ = cache.refresh().await;

        if write.requires_power() && !cache.is_on() {
            debug!(
                "{}: bulb is off, dropping {} write",
                notifier.device_id(),
                self.name()
            );
            return WriteOutcome::BulbOff;
        }

        if cache.issue(write.command()).await.is_err() {
            return WriteOutcome::Failed;
        }

        let event = write.event();
        if let Some(event) = &event {
            for dependent in dependents {
                dependent.handle_event(event, notifier);
            }
        }

        let value = write.value();
        self.set_cached_value_and_notify(value.clone(), notifier);
        WriteOutcome::Applied { value, event }
    }

    /// Reconciliation path: re-derive from the cache and announce on change.
    ///
    /// Returns whether the value changed.
    pub fn update<T>(&self, cache: &DeviceStateCache<T>) -> bool {
        let derived = cache.derive(self.kind);
        let mut current = self.lock();
        if *current == derived {
            return false;
        }
        *current = derived;
        cache.notifier().property_changed(self.name(), &current);
        true
    }

    /// Apply a derived-state event published by a sibling write.
    pub fn handle_event(&self, event: &StateEvent, notifier: &Notifier) -> bool {
        if !self.kind.consumes(event) {
            return false;
        }
        self.set_cached_value_and_notify(event.value(), notifier);
        true
    }

    fn set_cached_value_and_notify(&self, value: PropertyValue, notifier: &Notifier) {
        let mut current = self.lock();
        *current = value;
        notifier.property_changed(self.name(), &current);
    }

    fn lock(&self) -> MutexGuard<'_, PropertyValue> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
