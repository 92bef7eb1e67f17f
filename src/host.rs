//! The framework-side collaborator that receives device and property events.

use std::sync::Arc;

use log::debug;

use crate::device::DeviceDescription;
use crate::property::PropertyValue;

/// Receives everything the bridge reports to the smart-home framework.
///
/// Calls are made synchronously from whichever task produced the change and
/// should return quickly. `property_changed` runs while the property's value
/// is locked, so it must not read that property back.
pub trait Host: Send + Sync {
    /// A new device was paired.
    fn device_added(&self, device: &DeviceDescription);

    /// A property's cached value changed.
    fn property_changed(&self, device_id: &str, property: &str, value: &PropertyValue);

    /// The device became reachable or unreachable.
    fn connected_changed(&self, device_id: &str, connected: bool);
}

/// A device-scoped handle on the [`Host`].
#[derive(Clone)]
pub struct Notifier {
    device_id: String,
    host: Arc<dyn Host>,
}

impl Notifier {
    pub fn new(device_id: &str, host: Arc<dyn Host>) -> Self {
        Notifier {
            device_id: device_id.to_string(),
            host,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn property_changed(&self, property: &str, value: &PropertyValue) {
        debug!("{}: {} changed to {}", self.device_id, property, value);
        self.host.property_changed(&self.device_id, property, value);
    }

    pub fn connected_changed(&self, connected: bool) {
        self.host.connected_changed(&self.device_id, connected);
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
