//! Mock device client shared by the registry tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use wam_api::{Ack, ApiCall, ApiError, DeviceClient, PropertyMap, Result};

/// Handle handed out by [`MockDeviceClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    pub ip: IpAddr,
    pub id: usize,
}

#[derive(Default)]
pub struct MockDeviceClient {
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub fetches: AtomicUsize,
    next_id: AtomicUsize,
    states: Mutex<HashMap<IpAddr, PropertyMap>>,
    failing_connect: Mutex<HashSet<IpAddr>>,
    failing_fetch: Mutex<HashSet<IpAddr>>,
    failing_disconnect: Mutex<HashSet<IpAddr>>,
    connect_delay: Mutex<Duration>,
    fetch_delay: Mutex<Duration>,
    sent: Mutex<Vec<(IpAddr, ApiCall)>>,
}

impl MockDeviceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&self, ip: &str, state: Value) {
        let map = match state {
            Value::Object(map) => map,
            _ => PropertyMap::new(),
        };
        self.states.lock().insert(ip.parse().unwrap(), map);
    }

    pub fn fail_connect(&self, ip: &str) {
        self.failing_connect.lock().insert(ip.parse().unwrap());
    }

    pub fn fail_fetch(&self, ip: &str) {
        self.failing_fetch.lock().insert(ip.parse().unwrap());
    }

    pub fn fail_disconnect(&self, ip: &str) {
        self.failing_disconnect.lock().insert(ip.parse().unwrap());
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock() = delay;
    }

    /// Delay applied after the state is read, so a slow fetch returns what
    /// the device held when the fetch started
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = delay;
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(IpAddr, ApiCall)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DeviceClient for MockDeviceClient {
    type Handle = MockHandle;

    async fn connect(&self, ip: IpAddr, _port: u16) -> Result<MockHandle> {
        let delay = *self.connect_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing_connect.lock().contains(&ip) {
            return Err(ApiError::NetworkError(format!("{} unreachable", ip)));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MockHandle {
            ip,
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn disconnect(&self, handle: &MockHandle) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.failing_disconnect.lock().contains(&handle.ip) {
            return Err(ApiError::Disconnected);
        }
        Ok(())
    }

    async fn send_command(&self, handle: &MockHandle, call: &ApiCall) -> Result<Ack> {
        self.sent.lock().push((handle.ip, call.clone()));
        Ok(Ack::new(call.method.clone()))
    }

    async fn fetch_state(&self, handle: &MockHandle) -> Result<PropertyMap> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_fetch.lock().contains(&handle.ip) {
            return Err(ApiError::Timeout(2000));
        }
        let state = self.states.lock().get(&handle.ip).cloned().unwrap_or_default();
        let delay = *self.fetch_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(state)
    }
}
