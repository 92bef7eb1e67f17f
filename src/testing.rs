//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::device::DeviceDescription;
use crate::errors::Error;
use crate::host::Host;
use crate::property::PropertyValue;
use crate::snapshot::RawPropertySnapshot;
use crate::transport::{
    BulbCommand, BulbDiscovery, BulbTransport, CapabilityDescriptor, DiscoveredBulb,
};
use crate::types::{Brightness, Color, Kelvin, LightMode, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// A bulb that is on, in RGB mode, showing pure red.
pub(crate) fn color_snapshot() -> RawPropertySnapshot {
    RawPropertySnapshot {
        power: PowerMode::On,
        bright: 100,
        color_mode: LightMode::Rgb.into(),
        rgb: 0xFF0000,
        hue: 0,
        sat: 100,
        ct: 4000,
    }
}

#[derive(Debug)]
struct MockState {
    snapshot: RawPropertySnapshot,
    reachable: bool,
    fail_commands: bool,
    delay: Option<Duration>,
    commands: Vec<BulbCommand>,
    fetches: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// A scripted bulb. Clones share state, so tests keep a handle after giving
/// one away.
#[derive(Debug, Clone)]
pub(crate) struct MockBulb {
    state: Arc<Mutex<MockState>>,
}

impl MockBulb {
    pub fn new(snapshot: RawPropertySnapshot) -> Self {
        MockBulb {
            state: Arc::new(Mutex::new(MockState {
                snapshot,
                reachable: true,
                fail_commands: false,
                delay: None,
                commands: Vec::new(),
                fetches: 0,
                in_flight: 0,
                max_in_flight: 0,
            })),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().reachable = reachable;
    }

    pub fn fail_commands(&self, fail: bool) {
        self.state.lock().unwrap().fail_commands = fail;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn update_snapshot(&self, f: impl FnOnce(&mut RawPropertySnapshot)) {
        f(&mut self.state.lock().unwrap().snapshot);
    }

    pub fn commands(&self) -> Vec<BulbCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    /// Most requests ever outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    async fn call<R>(&self, f: impl FnOnce(&mut MockState) -> Result<R>) -> Result<R> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        f(&mut state)
    }

    fn apply(state: &mut MockState, command: BulbCommand) -> Result<()> {
        if !state.reachable || state.fail_commands {
            return Err(Error::communication(command.method(), "connection reset"));
        }

        let snapshot = &mut state.snapshot;
        match command {
            BulbCommand::Power(power) => snapshot.power = power,
            BulbCommand::Brightness(brightness) => snapshot.bright = brightness.value(),
            BulbCommand::Rgb(color) => {
                snapshot.rgb = color.packed();
                snapshot.color_mode = LightMode::Rgb.into();
            }
            BulbCommand::ColorTemperature(kelvin) => {
                snapshot.ct = kelvin.kelvin();
                snapshot.color_mode = LightMode::ColorTemperature.into();
            }
        }
        state.commands.push(command);
        Ok(())
    }
}

impl BulbTransport for MockBulb {
    async fn get_properties(&self) -> Result<RawPropertySnapshot> {
        self.call(|state| {
            if !state.reachable {
                return Err(Error::communication("get_prop", "no route to host"));
            }
            state.fetches += 1;
            Ok(state.snapshot.clone())
        })
        .await
    }

    async fn set_power(&self, power: PowerMode) -> Result<()> {
        self.call(|state| Self::apply(state, BulbCommand::Power(power))).await
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
        self.call(|state| Self::apply(state, BulbCommand::Brightness(brightness))).await
    }

    async fn set_rgb(&self, color: Color) -> Result<()> {
        self.call(|state| Self::apply(state, BulbCommand::Rgb(color))).await
    }

    async fn set_color_temperature(&self, kelvin: Kelvin) -> Result<()> {
        self.call(|state| Self::apply(state, BulbCommand::ColorTemperature(kelvin))).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostEvent {
    DeviceAdded(String),
    PropertyChanged {
        device: String,
        property: String,
        value: PropertyValue,
    },
    Connected {
        device: String,
        connected: bool,
    },
}

/// A host that remembers every call, in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn added_devices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::DeviceAdded(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn property_changes(&self, device_id: &str, name: &str) -> Vec<PropertyValue> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::PropertyChanged {
                    device,
                    property,
                    value,
                } if device == device_id && property == name => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn connectivity(&self, device_id: &str) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Connected { device, connected } if device == device_id => {
                    Some(connected)
                }
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Host for RecordingHost {
    fn device_added(&self, device: &DeviceDescription) {
        self.push(HostEvent::DeviceAdded(device.id.clone()));
    }

    fn property_changed(&self, device_id: &str, property: &str, value: &PropertyValue) {
        self.push(HostEvent::PropertyChanged {
            device: device_id.to_string(),
            property: property.to_string(),
            value: value.clone(),
        });
    }

    fn connected_changed(&self, device_id: &str, connected: bool) {
        self.push(HostEvent::Connected {
            device: device_id.to_string(),
            connected,
        });
    }
}

pub(crate) fn discovered(id: &str, model: &str, support: &str) -> DiscoveredBulb {
    DiscoveredBulb {
        address: SocketAddr::from(([192, 168, 1, 40], 55443)),
        capabilities: CapabilityDescriptor {
            id: id.to_string(),
            model: model.to_string(),
            name: String::new(),
            support: support.to_string(),
        },
    }
}

/// Discovery over a fixed set of mock bulbs.
#[derive(Debug, Default)]
pub(crate) struct MockDiscovery {
    bulbs: Mutex<Vec<(DiscoveredBulb, MockBulb)>>,
    fail_scan: Mutex<bool>,
    scans: Mutex<usize>,
}

impl MockDiscovery {
    pub fn add(&self, bulb: DiscoveredBulb, transport: MockBulb) {
        self.bulbs.lock().unwrap().push((bulb, transport));
    }

    pub fn fail_scan(&self, fail: bool) {
        *self.fail_scan.lock().unwrap() = fail;
    }

    pub fn scans(&self) -> usize {
        *self.scans.lock().unwrap()
    }

    fn transports(&self) -> HashMap<String, MockBulb> {
        self.bulbs
            .lock()
            .unwrap()
            .iter()
            .map(|(bulb, transport)| (bulb.capabilities.id.clone(), transport.clone()))
            .collect()
    }
}

impl BulbDiscovery for MockDiscovery {
    type Transport = MockBulb;

    async fn discover(&self, _timeout: Duration) -> Result<Vec<DiscoveredBulb>> {
        *self.scans.lock().unwrap() += 1;
        if *self.fail_scan.lock().unwrap() {
            return Err(Error::communication("discover", "multicast unavailable"));
        }
        Ok(self
            .bulbs
            .lock()
            .unwrap()
            .iter()
            .map(|(bulb, _)| bulb.clone())
            .collect())
    }

    async fn connect(&self, bulb: &DiscoveredBulb) -> Result<MockBulb> {
        self.transports()
            .remove(&bulb.capabilities.id)
            .ok_or_else(|| Error::communication("connect", "refused"))
    }
}
