//! Per-bulb state cache.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use log::{debug, info, warn};

use crate::capability::BulbCapabilities;
use crate::errors::Error;
use crate::host::Notifier;
use crate::property::{PropertyKind, PropertyValue};
use crate::runtime::{self, Mutex};
use crate::snapshot::{PropertyUpdate, RawPropertySnapshot};
use crate::transport::{BulbCommand, BulbTransport};
use crate::types::{Brightness, Color, ColorMode, Kelvin, KelvinRange};

type Result<T> = std::result::Result<T, Error>;

/// The latest reachable truth about one bulb.
///
/// Owns the bulb connection and the last successfully fetched
/// [`RawPropertySnapshot`]. All bulb calls go through the connection mutex,
/// so a poll cycle and a concurrent write never interleave on the wire.
/// A failed fetch keeps the previous snapshot and only flips the reachable
/// flag.
pub struct DeviceStateCache<T> {
    transport: Mutex<T>,
    capabilities: BulbCapabilities,
    kelvin_range: KelvinRange,
    snapshot: RwLock<RawPropertySnapshot>,
    reachable: AtomicBool,
    command_timeout: Option<Duration>,
    notifier: Notifier,
}

impl<T: BulbTransport> DeviceStateCache<T> {
    /// Wrap a connection, fetching the initial snapshot.
    ///
    /// Fails when the bulb cannot be read, so a constructed cache always has
    /// a snapshot to derive from.
    pub async fn connect(
        transport: T,
        capabilities: BulbCapabilities,
        kelvin_range: KelvinRange,
        command_timeout: Option<Duration>,
        notifier: Notifier,
    ) -> Result<Self> {
        let snapshot = bounded(command_timeout, "get_prop", transport.get_properties()).await?;
        debug!("{}: initial snapshot {:?}", notifier.device_id(), snapshot);

        Ok(DeviceStateCache {
            transport: Mutex::new(transport),
            capabilities,
            kelvin_range,
            snapshot: RwLock::new(snapshot),
            reachable: AtomicBool::new(true),
            command_timeout,
            notifier,
        })
    }

    /// Re-read the bulb's properties.
    ///
    /// On success the snapshot is replaced wholesale. On failure it is left
    /// untouched and the bulb is marked unreachable; the error is returned for
    /// information only.
    pub async fn refresh(&self) -> Result<()> {
        let result = {
            let transport = self.transport.lock().await;
            bounded(self.command_timeout, "get_prop", transport.get_properties()).await
        };

        match result {
            Ok(snapshot) => {
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = snapshot;
                self.set_reachable(true);
                Ok(())
            }
            Err(e) => {
                warn!("{}: refresh failed: {}", self.notifier.device_id(), e);
                if e.is_communication() {
                    self.set_reachable(false);
                }
                Err(e)
            }
        }
    }

    /// Send a command to the bulb.
    pub async fn issue(&self, command: BulbCommand) -> Result<()> {
        let result = {
            let transport = self.transport.lock().await;
            bounded(
                self.command_timeout,
                command.method(),
                command.send(&*transport),
            )
            .await
        };

        match &result {
            Ok(()) => self.set_reachable(true),
            Err(e) => {
                warn!("{}: {:?} failed: {}", self.notifier.device_id(), command, e);
                if e.is_communication() {
                    self.set_reachable(false);
                }
            }
        }
        result
    }
}

impl<T> DeviceStateCache<T> {
    /// Merge a pushed partial update into the snapshot.
    pub fn apply_update(&self, update: &PropertyUpdate) {
        self.snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(update);
        self.set_reachable(true);
    }

    pub fn snapshot(&self) -> RawPropertySnapshot {
        self.read().clone()
    }

    pub fn capabilities(&self) -> &BulbCapabilities {
        &self.capabilities
    }

    pub fn kelvin_range(&self) -> KelvinRange {
        self.kelvin_range
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Compute the framework value of `kind` from the current snapshot.
    pub fn derive(&self, kind: PropertyKind) -> PropertyValue {
        kind.derive(&self.read(), self.kelvin_range)
    }

    pub fn is_on(&self) -> bool {
        self.read().power.is_on()
    }

    pub fn brightness(&self) -> Brightness {
        Brightness::clamped(i64::from(self.read().bright))
    }

    pub fn color(&self) -> Color {
        self.read().color()
    }

    /// Reported color temperature, clamped into the bulb's range.
    pub fn color_temperature(&self) -> Kelvin {
        self.kelvin_range.clamp(i64::from(self.read().ct))
    }

    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from(self.read().light_mode())
    }

    fn read(&self) -> RwLockReadGuard<'_, RawPropertySnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_reachable(&self, reachable: bool) {
        if self.reachable.swap(reachable, Ordering::SeqCst) == reachable {
            return;
        }
        if reachable {
            info!("{}: reachable again", self.notifier.device_id());
        } else {
            warn!("{}: unreachable", self.notifier.device_id());
        }
        self.notifier.connected_changed(reachable);
    }
}

async fn bounded<F, R>(limit: Option<Duration>, action: &str, future: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    match limit {
        Some(limit) => runtime::timeout(limit, future)
            .await
            .map_err(|_| Error::timeout(action))?,
        None => future.await,
    }
}
