//! Live registry of connected devices
//!
//! Two locks guard the registry:
//! - `lifecycle` (async) serializes connect, disconnect and disconnect-all, so
//!   concurrent calls for one IP never create two records or tear down a
//!   record another call is still setting up.
//! - `inner` (sync) guards the device map and group table together. It is only
//!   held for in-memory work, never across an `.await`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use wam_api::{DeviceClient, PropertyMap};

use crate::error::{Result, StateError};
use crate::groups::GroupManager;
use crate::model::{ConnectResult, DeviceInfo, DeviceRecord, DeviceSummary, GroupId, GroupRecord};
use crate::synonyms::{self, UNKNOWN};

/// Model shown for a device whose snapshot names none
pub const PLACEHOLDER_MODEL: &str = "Samsung WAM Speaker";

/// Configuration for a [`DeviceRegistry`]
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Pause between opening a connection and fetching the first snapshot,
    /// giving the speaker time to accept requests
    /// Default: 250 ms
    pub settle_delay: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(250),
        }
    }
}

impl RegistryConfig {
    /// No settle delay, for tests and mocks
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

struct RegistryState<H> {
    devices: HashMap<IpAddr, DeviceRecord<H>>,
    groups: GroupManager,
}

/// Owns every connected device and the group table derived from them.
///
/// Created empty; [`disconnect_all`](DeviceRegistry::disconnect_all) is the
/// teardown and leaves it empty again.
pub struct DeviceRegistry<C: DeviceClient> {
    client: Arc<C>,
    config: RegistryConfig,
    lifecycle: Mutex<()>,
    inner: RwLock<RegistryState<C::Handle>>,
    next_generation: AtomicU64,
}

impl<C: DeviceClient> DeviceRegistry<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self::with_config(client, RegistryConfig::default())
    }

    pub fn with_config(client: Arc<C>, config: RegistryConfig) -> Self {
        Self {
            client,
            config,
            lifecycle: Mutex::new(()),
            inner: RwLock::new(RegistryState {
                devices: HashMap::new(),
                groups: GroupManager::new(),
            }),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Connect to `ip:port` and record the device.
    ///
    /// Connecting to an IP that already has a record opens nothing new and
    /// returns the existing summary with `already_connected` set. On failure
    /// nothing is recorded and any connection opened along the way is closed.
    pub async fn connect(&self, ip: IpAddr, port: u16) -> Result<ConnectResult> {
        let _guard = self.lifecycle.lock().await;

        if let Some(summary) = self.summary(ip) {
            tracing::debug!("{} already connected", ip);
            return Ok(ConnectResult {
                already_connected: true,
                summary,
            });
        }

        let handle = self
            .client
            .connect(ip, port)
            .await
            .map_err(|source| StateError::Connection { ip, source })?;

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let snapshot = match self.client.fetch_state(&handle).await {
            Ok(snapshot) => snapshot,
            Err(source) => {
                if let Err(e) = self.client.disconnect(&handle).await {
                    tracing::warn!("Failed to close connection to {} after failed fetch: {}", ip, e);
                }
                return Err(StateError::Connection { ip, source });
            }
        };

        let summary = {
            let mut inner = self.inner.write();
            let group = inner.groups.derive_group(ip, &snapshot);
            let summary = summarize(ip, port, &snapshot, group.is_some() || inner.groups.is_grouped(ip));
            inner.devices.insert(
                ip,
                DeviceRecord {
                    ip,
                    port,
                    handle,
                    snapshot,
                    generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
                    connected_at: Utc::now(),
                },
            );
            summary
        };

        tracing::info!("Connected to {} ({}) at {}:{}", summary.name, summary.model, ip, port);

        Ok(ConnectResult {
            already_connected: false,
            summary,
        })
    }

    /// Fetch a fresh snapshot for `ip` and replace the stored one wholesale.
    ///
    /// Group membership is not re-derived; see
    /// [`rederive_group`](DeviceRegistry::rederive_group).
    pub async fn refresh_state(&self, ip: IpAddr) -> Result<PropertyMap> {
        let (handle, generation) = {
            let inner = self.inner.read();
            let record = inner.devices.get(&ip).ok_or(StateError::NotFound(ip))?;
            (record.handle.clone(), record.generation)
        };

        let snapshot = self
            .client
            .fetch_state(&handle)
            .await
            .map_err(|source| StateError::Refresh { ip, source })?;

        let mut inner = self.inner.write();
        match inner.devices.get_mut(&ip) {
            // A reconnect in between produced a new record; keep its snapshot
            Some(record) if record.generation == generation => {
                record.snapshot = snapshot.clone();
                Ok(snapshot)
            }
            _ => Err(StateError::NotFound(ip)),
        }
    }

    /// Add `ip` to the group its current snapshot names, if any
    pub fn rederive_group(&self, ip: IpAddr) -> Result<Option<GroupId>> {
        let mut inner = self.inner.write();
        let RegistryState { devices, groups } = &mut *inner;
        let record = devices.get(&ip).ok_or(StateError::NotFound(ip))?;
        Ok(groups.derive_group(ip, &record.snapshot))
    }

    /// Disconnect one device and forget it.
    ///
    /// The record is removed even when the client fails to disconnect.
    pub async fn disconnect(&self, ip: IpAddr) -> Result<()> {
        let _guard = self.lifecycle.lock().await;

        let handle = self.handle(ip).ok_or(StateError::NotFound(ip))?;
        if let Err(e) = self.client.disconnect(&handle).await {
            tracing::warn!("Disconnect from {} failed, dropping record anyway: {}", ip, e);
        }

        let mut inner = self.inner.write();
        inner.devices.remove(&ip);
        inner.groups.remove_member(ip);
        tracing::info!("Disconnected from {}", ip);
        Ok(())
    }

    /// Disconnect every device and clear all groups. Returns how many devices
    /// were connected.
    pub async fn disconnect_all(&self) -> usize {
        let _guard = self.lifecycle.lock().await;

        let handles: Vec<(IpAddr, C::Handle)> = {
            let inner = self.inner.read();
            inner.devices.values().map(|r| (r.ip, r.handle.clone())).collect()
        };

        let outcomes = join_all(handles.iter().map(|(_, handle)| self.client.disconnect(handle))).await;
        for ((ip, _), outcome) in handles.iter().zip(outcomes) {
            if let Err(e) = outcome {
                tracing::warn!("Disconnect from {} failed: {}", ip, e);
            }
        }

        let mut inner = self.inner.write();
        inner.devices.clear();
        inner.groups.clear();
        tracing::info!("Disconnected all {} device(s)", handles.len());
        handles.len()
    }

    pub fn handle(&self, ip: IpAddr) -> Option<C::Handle> {
        self.inner.read().devices.get(&ip).map(|r| r.handle.clone())
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.inner.read().devices.contains_key(&ip)
    }

    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().devices.is_empty()
    }

    /// Summaries of all connected devices, sorted by IP
    pub fn list(&self) -> Vec<DeviceSummary> {
        let inner = self.inner.read();
        let mut summaries: Vec<DeviceSummary> = inner
            .devices
            .values()
            .map(|r| summarize(r.ip, r.port, &r.snapshot, inner.groups.is_grouped(r.ip)))
            .collect();
        summaries.sort_by_key(|s| s.ip);
        summaries
    }

    pub fn ips(&self) -> Vec<IpAddr> {
        let mut ips: Vec<IpAddr> = self.inner.read().devices.keys().copied().collect();
        ips.sort();
        ips
    }

    pub fn summary(&self, ip: IpAddr) -> Option<DeviceSummary> {
        let inner = self.inner.read();
        inner
            .devices
            .get(&ip)
            .map(|r| summarize(r.ip, r.port, &r.snapshot, inner.groups.is_grouped(ip)))
    }

    /// Current property snapshot of `ip`
    pub fn properties(&self, ip: IpAddr) -> Option<PropertyMap> {
        self.inner.read().devices.get(&ip).map(|r| r.snapshot.clone())
    }

    /// Normalized info view of `ip`
    pub fn info(&self, ip: IpAddr) -> Option<DeviceInfo> {
        self.inner.read().devices.get(&ip).map(|r| device_info(r.ip, &r.snapshot))
    }

    /// Generation of the current record for `ip`; a reconnect always yields a
    /// larger one
    pub fn generation(&self, ip: IpAddr) -> Option<u64> {
        self.inner.read().devices.get(&ip).map(|r| r.generation)
    }

    pub fn group_of(&self, ip: IpAddr) -> Option<GroupId> {
        self.inner.read().groups.group_of(ip)
    }

    pub fn group_members(&self, id: &GroupId) -> Option<Vec<IpAddr>> {
        self.inner.read().groups.members(id)
    }

    pub fn groups(&self) -> Vec<GroupRecord> {
        self.inner.read().groups.all_groups()
    }
}

fn display_name(ip: IpAddr, snapshot: &PropertyMap) -> String {
    synonyms::resolve(snapshot, synonyms::NAME_KEYS).unwrap_or_else(|| format!("WAM Speaker at {}", ip))
}

fn display_model(snapshot: &PropertyMap) -> String {
    synonyms::resolve_or(snapshot, synonyms::MODEL_KEYS, PLACEHOLDER_MODEL)
}

fn summarize(ip: IpAddr, port: u16, snapshot: &PropertyMap, is_grouped: bool) -> DeviceSummary {
    DeviceSummary {
        ip,
        port,
        name: display_name(ip, snapshot),
        model: display_model(snapshot),
        is_grouped,
    }
}

/// Name and model share the summary placeholders; everything else falls
/// back to "Unknown"
fn device_info(ip: IpAddr, snapshot: &PropertyMap) -> DeviceInfo {
    DeviceInfo {
        name: display_name(ip, snapshot),
        model: display_model(snapshot),
        mac: synonyms::resolve_or(snapshot, synonyms::MAC_KEYS, UNKNOWN),
        version: synonyms::resolve_or(snapshot, synonyms::VERSION_KEYS, UNKNOWN),
        power: synonyms::resolve_or(snapshot, synonyms::POWER_KEYS, UNKNOWN),
        volume: synonyms::resolve_or(snapshot, synonyms::VOLUME_KEYS, UNKNOWN),
        input: synonyms::resolve_or(snapshot, synonyms::INPUT_KEYS, UNKNOWN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> PropertyMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => PropertyMap::new(),
        }
    }

    #[test]
    fn test_summary_placeholders() {
        let ip: IpAddr = "10.0.0.5".parse().unwrap();
        let summary = summarize(ip, 55001, &PropertyMap::new(), false);
        assert_eq!(summary.name, "WAM Speaker at 10.0.0.5");
        assert_eq!(summary.model, "Samsung WAM Speaker");
    }

    #[test]
    fn test_summary_uses_synonyms() {
        let ip: IpAddr = "10.0.0.5".parse().unwrap();
        let summary = summarize(ip, 55001, &snapshot(json!({"friendlyName": "Den", "model_name": "WAM550"})), true);
        assert_eq!(summary.name, "Den");
        assert_eq!(summary.model, "WAM550");
        assert!(summary.is_grouped);
    }

    #[test]
    fn test_info_defaults_to_unknown() {
        let ip: IpAddr = "10.0.0.5".parse().unwrap();
        let info = device_info(ip, &snapshot(json!({"name": "Den", "volume": 7, "source": "wifi"})));
        assert_eq!(info.name, "Den");
        assert_eq!(info.volume, "7");
        assert_eq!(info.input, "wifi");
        assert_eq!(info.mac, "Unknown");
        assert_eq!(info.version, "Unknown");
    }

    #[test]
    fn test_info_and_summary_share_placeholders() {
        let ip: IpAddr = "10.0.0.5".parse().unwrap();
        let empty = PropertyMap::new();
        let info = device_info(ip, &empty);
        let summary = summarize(ip, 55001, &empty, false);

        assert_eq!(info.name, summary.name);
        assert_eq!(info.model, summary.model);
        assert_eq!(info.name, "WAM Speaker at 10.0.0.5");
        assert_eq!(info.model, "Samsung WAM Speaker");
        assert_eq!(info.power, "Unknown");
    }

    #[test]
    fn test_default_settle_delay() {
        assert_eq!(RegistryConfig::default().settle_delay, Duration::from_millis(250));
        assert!(RegistryConfig::immediate().settle_delay.is_zero());
    }
}
