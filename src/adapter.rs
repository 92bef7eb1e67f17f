//! Pairing: turning discovered bulbs into bridged devices.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use log::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::device::YeelightDevice;
use crate::errors::Error;
use crate::host::Host;
use crate::runtime::Mutex;
use crate::transport::{BulbDiscovery, DiscoveredBulb};

type Result<T> = std::result::Result<T, Error>;

/// Owns every device found through one discovery source.
///
/// At most one pairing scan runs at a time. Cancelling a scan only stops it
/// from bridging further bulbs; a new scan can start once it has returned.
pub struct YeelightAdapter<D: BulbDiscovery> {
    discovery: D,
    host: Arc<dyn Host>,
    config: BridgeConfig,
    devices: Mutex<HashMap<String, Arc<YeelightDevice<D::Transport>>>>,
    scan: Mutex<()>,
    cancelled: AtomicBool,
}

impl<D: BulbDiscovery> YeelightAdapter<D> {
    pub const ID: &'static str = "yeelight-adapter";

    pub fn new(discovery: D, host: Arc<dyn Host>, config: BridgeConfig) -> Self {
        YeelightAdapter {
            discovery,
            host,
            config,
            devices: Mutex::new(HashMap::new()),
            scan: Mutex::new(()),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Framework id of the device bridging this bulb.
    pub fn device_id(bulb: &DiscoveredBulb) -> String {
        format!("yeelight-{}", bulb.capabilities.id)
    }

    /// Scan once and bridge every bulb not seen before.
    ///
    /// Returns the ids of the devices added. A call made while another scan
    /// is running, cancelled or not, returns immediately with nothing.
    pub async fn start_pairing(&self) -> Vec<String> {
        let Ok(_scan) = self.scan.try_lock() else {
            debug!("pairing already in progress");
            return Vec::new();
        };
        self.cancelled.store(false, Ordering::SeqCst);

        let bulbs = match self.discovery.discover(self.config.pairing_timeout).await {
            Ok(bulbs) => bulbs,
            Err(e) => {
                warn!("discovery failed: {}", e);
                return Vec::new();
            }
        };
        info!("discovered {} bulb(s)", bulbs.len());

        let mut added = Vec::new();
        for bulb in bulbs {
            if self.cancelled.load(Ordering::SeqCst) {
                info!("pairing cancelled");
                break;
            }

            let id = Self::device_id(&bulb);
            if self.devices.lock().await.contains_key(&id) {
                continue;
            }

            match self.pair(&id, &bulb).await {
                Ok(device) => {
                    self.host.device_added(&device.description());
                    device.start_polling();
                    self.devices.lock().await.insert(id.clone(), Arc::new(device));
                    info!("paired {} at {}", id, bulb.address);
                    added.push(id);
                }
                Err(e) => warn!("could not pair {} at {}: {}", id, bulb.address, e),
            }
        }

        added
    }

    /// Stop bridging further bulbs from the scan in progress.
    pub fn cancel_pairing(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_pairing(&self) -> bool {
        self.scan.try_lock().is_err()
    }

    pub async fn device(&self, id: &str) -> Option<Arc<YeelightDevice<D::Transport>>> {
        self.devices.lock().await.get(id).cloned()
    }

    pub async fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.devices.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stop one device's poll loop and forget it, so the next scan can pair
    /// the bulb again. Returns whether the device was known.
    pub async fn remove_device(&self, id: &str) -> bool {
        let Some(device) = self.devices.lock().await.remove(id) else {
            return false;
        };
        device.shutdown().await;
        info!("removed {}", id);
        true
    }

    /// Stop every device's poll loop and forget them.
    pub async fn unload(&self) {
        let devices: Vec<_> = self.devices.lock().await.drain().map(|(_, d)| d).collect();
        join_all(devices.iter().map(|device| device.shutdown())).await;
    }

    async fn pair(&self, id: &str, bulb: &DiscoveredBulb) -> Result<YeelightDevice<D::Transport>> {
        let transport = self.discovery.connect(bulb).await?;
        YeelightDevice::new(
            id,
            &bulb.capabilities,
            transport,
            Arc::clone(&self.host),
            &self.config,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;
    use crate::testing::{MockBulb, MockDiscovery, RecordingHost, color_snapshot, discovered};
    use std::time::Duration;

    fn adapter(discovery: MockDiscovery, host: &Arc<RecordingHost>) -> YeelightAdapter<MockDiscovery> {
        YeelightAdapter::new(discovery, host.clone(), BridgeConfig::default())
    }

    #[tokio::test]
    async fn test_pairs_new_bulbs_once() {
        let discovery = MockDiscovery::default();
        discovery.add(discovered("0x1", "color1", "set_power set_rgb set_hsv"), MockBulb::new(color_snapshot()));
        discovery.add(discovered("0x2", "mono1", "set_power set_bright"), MockBulb::new(color_snapshot()));
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);

        let added = adapter.start_pairing().await;
        assert_eq!(added, vec!["yeelight-0x1", "yeelight-0x2"]);
        assert_eq!(host.added_devices(), vec!["yeelight-0x1", "yeelight-0x2"]);

        assert!(adapter.start_pairing().await.is_empty());
        assert_eq!(host.added_devices().len(), 2);
        assert_eq!(adapter.device_ids().await, vec!["yeelight-0x1", "yeelight-0x2"]);

        let device = adapter.device("yeelight-0x2").await.unwrap();
        assert!(device.is_polling());
        assert!(!adapter.is_pairing());

        adapter.unload().await;
        assert!(!device.is_polling());
        assert!(adapter.device_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_bulb_skipped() {
        let discovery = MockDiscovery::default();
        let dead = MockBulb::new(color_snapshot());
        dead.set_reachable(false);
        discovery.add(discovered("0xdead", "color1", "set_power"), dead);
        discovery.add(discovered("0xbeef", "color1", "set_power"), MockBulb::new(color_snapshot()));
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);

        assert_eq!(adapter.start_pairing().await, vec!["yeelight-0xbeef"]);
        assert!(adapter.device("yeelight-0xdead").await.is_none());
        adapter.unload().await;
    }

    #[tokio::test]
    async fn test_failed_scan() {
        let discovery = MockDiscovery::default();
        discovery.fail_scan(true);
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);

        assert!(adapter.start_pairing().await.is_empty());
        assert!(!adapter.is_pairing());
        assert_eq!(adapter.discovery.scans(), 1);
    }

    #[tokio::test]
    async fn test_paired_device_accepts_writes() {
        let discovery = MockDiscovery::default();
        let bulb = MockBulb::new(color_snapshot());
        discovery.add(discovered("0x9", "color1", "set_power set_bright"), bulb.clone());
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);
        adapter.start_pairing().await;

        let device = adapter.device("yeelight-0x9").await.unwrap();
        let outcome = device
            .set_property("level", &PropertyValue::Integer(64))
            .await;
        assert!(outcome.is_applied());
        assert_eq!(
            host.property_changes("yeelight-0x9", "level"),
            vec![PropertyValue::Integer(64)]
        );
        adapter.unload().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_cancel_waits_for_running_scan() {
        let discovery = MockDiscovery::default();
        let slow = MockBulb::new(color_snapshot());
        slow.set_delay(Duration::from_secs(1));
        discovery.add(discovered("0x1", "color1", "set_power"), slow);
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);

        let (first, second) = tokio::join!(adapter.start_pairing(), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(adapter.is_pairing());
            adapter.cancel_pairing();
            adapter.start_pairing().await
        });

        assert_eq!(first, vec!["yeelight-0x1"]);
        assert!(second.is_empty());
        assert_eq!(host.added_devices(), vec!["yeelight-0x1"]);
        assert_eq!(adapter.discovery.scans(), 1);
        assert!(!adapter.is_pairing());

        assert!(adapter.start_pairing().await.is_empty());
        assert_eq!(adapter.discovery.scans(), 2);
        adapter.unload().await;
    }

    #[tokio::test]
    async fn test_stale_cancel_does_not_block_next_scan() {
        let discovery = MockDiscovery::default();
        discovery.add(discovered("0x1", "color1", "set_power"), MockBulb::new(color_snapshot()));
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);

        adapter.cancel_pairing();
        assert_eq!(adapter.start_pairing().await, vec!["yeelight-0x1"]);
        adapter.unload().await;
    }

    #[tokio::test]
    async fn test_removed_device_pairs_again() {
        let discovery = MockDiscovery::default();
        discovery.add(discovered("0x5", "color1", "set_power"), MockBulb::new(color_snapshot()));
        let host = RecordingHost::new();
        let adapter = adapter(discovery, &host);
        adapter.start_pairing().await;
        let device = adapter.device("yeelight-0x5").await.unwrap();

        assert!(adapter.remove_device("yeelight-0x5").await);
        assert!(!device.is_polling());
        assert!(adapter.device_ids().await.is_empty());
        assert!(!adapter.remove_device("yeelight-0x5").await);

        assert_eq!(adapter.start_pairing().await, vec!["yeelight-0x5"]);
        assert_eq!(host.added_devices(), vec!["yeelight-0x5", "yeelight-0x5"]);
        assert!(adapter.device("yeelight-0x5").await.unwrap().is_polling());
        adapter.unload().await;
    }
}
