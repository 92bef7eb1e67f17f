//! # yeelight_bridge
//!
//! Mirrors Yeelight smart bulbs into a generic smart-home property model and
//! keeps both sides eventually consistent over an unreliable LAN link.
//!
//! Each bridged bulb becomes a [`YeelightDevice`] exposing a fixed set of
//! typed properties derived from its advertised capabilities:
//!
//! | property           | type    | bounds                                  |
//! |--------------------|---------|-----------------------------------------|
//! | `on`               | boolean |                                         |
//! | `level`            | integer | 0-100                                   |
//! | `color`            | string  | `#RRGGBB`                               |
//! | `colorTemperature` | integer | model-specific, default 1700-6500       |
//! | `colorMode`        | string  | `color` / `temperature`, read-only      |
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use yeelight_bridge::{BridgeConfig, PropertyValue, YeelightAdapter};
//!
//! async fn bridge(discovery: MyDiscovery, host: Arc<MyHost>) {
//!     let adapter = YeelightAdapter::new(discovery, host, BridgeConfig::default());
//!     for id in adapter.start_pairing().await {
//!         let device = adapter.device(&id).await.unwrap();
//!         device.set_property("on", &PropertyValue::Boolean(true)).await;
//!     }
//! }
//! ```
//!
//! ## Collaborators
//!
//! The bulb protocol and the smart-home framework both live outside this
//! crate:
//!
//! - [`BulbTransport`] / [`BulbDiscovery`]: find bulbs, read their
//!   properties and send commands.
//! - [`Host`]: receives device-added, property-changed and connectivity
//!   events.
//!
//! ## Synchronization
//!
//! - Writes refresh the bulb state, send the command, then cache and announce
//!   the new value. Everything but `on` is dropped while the bulb is off.
//! - A background loop refreshes every [`BridgeConfig::poll_interval`] and
//!   announces only the properties whose derived value changed.
//! - Communication failures never escape: the last snapshot is kept and the
//!   device is reported disconnected until the bulb answers again.

mod adapter;
mod cache;
mod capability;
mod config;
mod device;
mod errors;
mod host;
mod property;
pub mod runtime;
mod snapshot;
mod transport;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use adapter::YeelightAdapter;
pub use cache::DeviceStateCache;
pub use capability::{BulbCapabilities, Capability};
pub use config::{BridgeConfig, ModelSpec};
pub use device::{DeviceDescription, YeelightDevice};
pub use errors::Error;
pub use host::{Host, Notifier};
pub use property::{
    DataType, Property, PropertyKind, PropertySchema, PropertyValue, PropertyWrite, StateEvent,
    WriteOutcome,
};
pub use snapshot::{PropertyUpdate, RawPropertySnapshot};
pub use transport::{BulbCommand, BulbDiscovery, BulbTransport, CapabilityDescriptor, DiscoveredBulb};
pub use types::{Brightness, Color, ColorMode, Hsv, Kelvin, KelvinRange, LightMode, PowerMode};
