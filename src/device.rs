//! A bridged bulb: its properties, write dispatch and poll loop.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::cache::DeviceStateCache;
use crate::config::{BridgeConfig, ModelSpec};
use crate::errors::Error;
use crate::host::{Host, Notifier};
use crate::property::{Property, PropertyKind, PropertySchema, PropertyValue, WriteOutcome};
use crate::runtime::{self, CancellationToken, JoinHandle};
use crate::snapshot::PropertyUpdate;
use crate::transport::{BulbTransport, CapabilityDescriptor};

type Result<T> = std::result::Result<T, Error>;

/// What the framework is told about a device when it is added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescription {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "@type")]
    pub types: Vec<&'static str>,
    pub properties: BTreeMap<&'static str, PropertySchema>,
}

struct DeviceInner<T> {
    id: String,
    title: String,
    model: String,
    types: Vec<&'static str>,
    cache: DeviceStateCache<T>,
    properties: Vec<Property>,
    poll_interval: Duration,
}

struct Poller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// One Yeelight bulb bridged into the framework.
///
/// The exposed property set is fixed at construction from the bulb's
/// capabilities. Writes go through [`set_property`](Self::set_property);
/// drift is picked up by [`poll_once`](Self::poll_once), which the
/// background loop started by [`start_polling`](Self::start_polling) runs
/// every poll interval.
pub struct YeelightDevice<T> {
    inner: Arc<DeviceInner<T>>,
    poller: Mutex<Option<Poller>>,
}

impl<T: BulbTransport + 'static> YeelightDevice<T> {
    /// Bridge a connected bulb, reading its state once.
    pub async fn new(
        id: &str,
        descriptor: &CapabilityDescriptor,
        transport: T,
        host: Arc<dyn Host>,
        config: &BridgeConfig,
    ) -> Result<Self> {
        let capabilities = descriptor.capabilities();
        let kelvin_range = ModelSpec::kelvin_range_for(&descriptor.model);

        let cache = DeviceStateCache::connect(
            transport,
            capabilities,
            kelvin_range,
            config.command_timeout,
            Notifier::new(id, host),
        )
        .await?;

        let properties: Vec<Property> = PropertyKind::iter()
            .filter(|kind| kind.is_exposed(cache.capabilities()))
            .map(|kind| Property::new(kind, kelvin_range, cache.derive(kind)))
            .collect();

        let caps = cache.capabilities();
        let mut types = vec!["OnOffSwitch", "Light"];
        if caps.is_color() || caps.is_variable_color_temp() {
            types.push("ColorControl");
        }

        let title = if descriptor.name.is_empty() {
            descriptor.model.clone()
        } else {
            descriptor.name.clone()
        };

        if config.poll_interval < BridgeConfig::MIN_POLL_INTERVAL {
            warn!(
                "{}: poll interval {:?} raised to {:?}",
                id,
                config.poll_interval,
                BridgeConfig::MIN_POLL_INTERVAL
            );
        }

        debug!(
            "{}: exposing {:?}",
            id,
            properties.iter().map(Property::name).collect::<Vec<_>>()
        );

        Ok(YeelightDevice {
            inner: Arc::new(DeviceInner {
                id: id.to_string(),
                title,
                model: descriptor.model.clone(),
                types,
                cache,
                properties,
                poll_interval: config.effective_poll_interval(),
            }),
            poller: Mutex::new(None),
        })
    }

    /// Handle a write request from the framework.
    ///
    /// Unknown property names are rejected without contacting the bulb.
    pub async fn set_property(&self, name: &str, value: &PropertyValue) -> WriteOutcome {
        let Some(property) = PropertyKind::from_str(name)
            .ok()
            .and_then(|kind| self.inner.property(kind))
        else {
            warn!("{}: no property named {}", self.inner.id, name);
            return WriteOutcome::Rejected;
        };

        property
            .set_value(value, &self.inner.cache, &self.inner.properties)
            .await
    }

    /// Run one reconciliation cycle now.
    pub async fn poll_once(&self) {
        self.inner.poll_once().await;
    }

    /// Apply a `props` notification pushed by the bulb.
    pub fn handle_notification(&self, params: &Value) -> Result<()> {
        let update: PropertyUpdate =
            serde_json::from_value(params.clone()).map_err(Error::JsonLoad)?;
        if update.is_empty() {
            return Ok(());
        }
        self.inner.cache.apply_update(&update);
        self.inner.update_all();
        Ok(())
    }

    /// Start the background poll loop. Does nothing if it is already running.
    pub fn start_polling(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let cancelled = token.clone();
        let handle = runtime::spawn(async move { inner.poll_loop(cancelled).await });
        *poller = Some(Poller { token, handle });
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Stop the poll loop and wait for it to finish its current cycle.
    pub async fn shutdown(&self) {
        let poller = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(Poller { token, handle }) = poller {
            token.cancel();
            handle.await;
            info!("{}: stopped polling", self.inner.id);
        }
    }
}

impl<T> YeelightDevice<T> {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn model(&self) -> &str {
        &self.inner.model
    }

    pub fn is_connected(&self) -> bool {
        self.inner.cache.is_reachable()
    }

    pub fn properties(&self) -> &[Property] {
        &self.inner.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        let kind = PropertyKind::from_str(name).ok()?;
        self.inner.property(kind)
    }

    pub fn description(&self) -> DeviceDescription {
        DeviceDescription {
            id: self.inner.id.clone(),
            title: self.inner.title.clone(),
            description: self.inner.model.clone(),
            types: self.inner.types.clone(),
            properties: self
                .inner
                .properties
                .iter()
                .map(|p| (p.name(), p.schema().clone()))
                .collect(),
        }
    }
}

impl<T> Drop for YeelightDevice<T> {
    fn drop(&mut self) {
        if let Some(poller) = self
            .poller
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            poller.token.cancel();
        }
    }
}

impl<T> DeviceInner<T> {
    fn property(&self, kind: PropertyKind) -> Option<&Property> {
        self.properties.iter().find(|p| p.kind() == kind)
    }

    fn update_all(&self) {
        for property in &self.properties {
            property.update(&self.cache);
        }
    }
}

impl<T: BulbTransport> DeviceInner<T> {
    async fn poll_once(&self) {
        // Failures keep the last snapshot, so the update below is a no-op.
        if self.cache.refresh().await.is_ok() {
            debug!("{}: refreshed", self.id);
        }
        self.update_all();
    }

    async fn poll_loop(&self, token: CancellationToken) {
        debug!("{}: polling every {:?}", self.id, self.poll_interval);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = runtime::sleep(self.poll_interval) => {}
            }
            self.poll_once().await;
        }
    }
}
