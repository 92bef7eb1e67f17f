//! The bulb-side collaborator: discovery, connections and commands.
//!
//! The wire protocol lives outside this crate. Anything that can fetch a
//! [`RawPropertySnapshot`] and issue the handful of commands below can be
//! bridged.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capability::BulbCapabilities;
use crate::errors::Error;
use crate::snapshot::RawPropertySnapshot;
use crate::types::{Brightness, Color, Kelvin, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// A live connection to one bulb.
///
/// Every method fails with [`Error::Communication`] (or [`Error::Timeout`])
/// when the bulb cannot be reached. Calls for one bulb are serialized by the
/// caller, so implementations never see two requests in flight at once.
pub trait BulbTransport: Send + Sync {
    /// Fetch the bulb's current properties.
    fn get_properties(&self) -> impl Future<Output = Result<RawPropertySnapshot>> + Send;

    fn set_power(&self, power: PowerMode) -> impl Future<Output = Result<()>> + Send;

    fn set_brightness(&self, brightness: Brightness) -> impl Future<Output = Result<()>> + Send;

    fn set_rgb(&self, color: Color) -> impl Future<Output = Result<()>> + Send;

    fn set_color_temperature(&self, kelvin: Kelvin) -> impl Future<Output = Result<()>> + Send;
}

/// A command issued to a bulb on behalf of a property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbCommand {
    Power(PowerMode),
    Brightness(Brightness),
    Rgb(Color),
    ColorTemperature(Kelvin),
}

impl BulbCommand {
    /// The bulb method this command maps to, for logs and errors.
    pub fn method(&self) -> &'static str {
        match self {
            BulbCommand::Power(_) => "set_power",
            BulbCommand::Brightness(_) => "set_bright",
            BulbCommand::Rgb(_) => "set_rgb",
            BulbCommand::ColorTemperature(_) => "set_ct_abx",
        }
    }

    pub(crate) async fn send<T: BulbTransport>(self, transport: &T) -> Result<()> {
        match self {
            BulbCommand::Power(power) => transport.set_power(power).await,
            BulbCommand::Brightness(brightness) => transport.set_brightness(brightness).await,
            BulbCommand::Rgb(color) => transport.set_rgb(color).await,
            BulbCommand::ColorTemperature(kelvin) => transport.set_color_temperature(kelvin).await,
        }
    }
}

/// What a bulb advertises about itself when discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Unique bulb id, stable across restarts.
    pub id: String,
    /// Model name, e.g. `"color1"`.
    pub model: String,
    /// User-assigned name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Space-separated list of supported commands.
    pub support: String,
}

impl CapabilityDescriptor {
    pub fn capabilities(&self) -> BulbCapabilities {
        BulbCapabilities::from_support(&self.support)
    }
}

/// A bulb found on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBulb {
    pub address: SocketAddr,
    pub capabilities: CapabilityDescriptor,
}

/// Finds bulbs and opens connections to them.
pub trait BulbDiscovery: Send + Sync {
    type Transport: BulbTransport + 'static;

    /// Scan the network, returning every bulb that answered within `timeout`.
    fn discover(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<DiscoveredBulb>>> + Send;

    fn connect(&self, bulb: &DiscoveredBulb)
    -> impl Future<Output = Result<Self::Transport>> + Send;
}
