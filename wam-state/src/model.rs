//! Records and views kept by the registry

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wam_api::PropertyMap;

/// Identifier of a speaker group
///
/// Taken verbatim from a device's group-id property when it has one. Devices
/// that only expose a group name get `name:<group name>`, and devices that
/// only say they are grouped share [`GroupId::ANONYMOUS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Shared id for devices that report being grouped without saying which group
    pub const ANONYMOUS: &'static str = "grouped";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_group_name(name: &str) -> Self {
        Self(format!("name:{}", name))
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId::new(s)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        GroupId::new(s)
    }
}

/// A connected device as stored by the registry
#[derive(Debug, Clone)]
pub struct DeviceRecord<H> {
    pub ip: IpAddr,
    pub port: u16,
    pub handle: H,
    /// Last fetched properties, replaced wholesale on refresh
    pub snapshot: PropertyMap,
    /// Distinct per connect, increasing across the registry's lifetime
    pub generation: u64,
    pub connected_at: DateTime<Utc>,
}

/// Listing entry for a connected device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub ip: IpAddr,
    pub port: u16,
    pub name: String,
    pub model: String,
    pub is_grouped: bool,
}

/// Outcome of [`DeviceRegistry::connect`](crate::DeviceRegistry::connect)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResult {
    /// Set when a record already existed and no new connection was made
    pub already_connected: bool,
    pub summary: DeviceSummary,
}

/// Normalized device information, `"Unknown"` for anything not reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub model: String,
    pub mac: String,
    pub version: String,
    pub power: String,
    pub volume: String,
    pub input: String,
}

/// A group and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub members: BTreeSet<IpAddr>,
}
