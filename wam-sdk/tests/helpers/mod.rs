//! In-memory device client for system tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use wam_sdk::{Ack, ApiCall, ApiError, DeviceClient, PropertyMap, RegistryConfig, SystemConfig, WamSystem};

#[derive(Default)]
struct Shared {
    connects: AtomicUsize,
    states: Mutex<HashMap<IpAddr, PropertyMap>>,
    failing_send: Mutex<HashSet<IpAddr>>,
    send_delay: Mutex<Duration>,
    sent: Mutex<Vec<(IpAddr, ApiCall)>>,
}

/// Cloneable mock; clones share counters so a test can keep one after handing
/// the other to a [`WamSystem`]
#[derive(Clone, Default)]
pub struct MockDeviceClient {
    shared: Arc<Shared>,
}

impl MockDeviceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, ip: &str, state: Value) -> Self {
        let map = match state {
            Value::Object(map) => map,
            _ => PropertyMap::new(),
        };
        self.shared.states.lock().insert(ip.parse().unwrap(), map);
        self
    }

    pub fn fail_send(&self, ip: &str) {
        self.shared.failing_send.lock().insert(ip.parse().unwrap());
    }

    /// Every `send_command` sleeps this long before answering
    pub fn with_send_delay(self, delay: Duration) -> Self {
        *self.shared.send_delay.lock() = delay;
        self
    }

    pub fn connect_count(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(IpAddr, ApiCall)> {
        self.shared.sent.lock().clone()
    }

    pub fn sent_to(&self, ip: &str) -> Vec<ApiCall> {
        let ip: IpAddr = ip.parse().unwrap();
        self.sent().into_iter().filter(|(to, _)| *to == ip).map(|(_, call)| call).collect()
    }
}

#[async_trait]
impl DeviceClient for MockDeviceClient {
    type Handle = IpAddr;

    async fn connect(&self, ip: IpAddr, _port: u16) -> Result<IpAddr, ApiError> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        Ok(ip)
    }

    async fn disconnect(&self, _handle: &IpAddr) -> Result<(), ApiError> {
        Ok(())
    }

    async fn send_command(&self, handle: &IpAddr, call: &ApiCall) -> Result<Ack, ApiError> {
        let delay = *self.shared.send_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.shared.failing_send.lock().contains(handle) {
            return Err(ApiError::NetworkError(format!("{} did not answer", handle)));
        }
        self.shared.sent.lock().push((*handle, call.clone()));
        Ok(Ack::new(call.method.clone()).with_data(json!({"ok": true})))
    }

    async fn fetch_state(&self, handle: &IpAddr) -> Result<PropertyMap, ApiError> {
        Ok(self.shared.states.lock().get(handle).cloned().unwrap_or_default())
    }
}

/// A system over `client` with no settle delay
pub fn system(client: &MockDeviceClient) -> WamSystem<MockDeviceClient> {
    let config = SystemConfig::default().with_registry(RegistryConfig::immediate());
    WamSystem::with_config(client.clone(), config).unwrap()
}
