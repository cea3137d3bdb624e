//! Messages pushed to listeners

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use wam_api::{ApiEvent, PropertyMap};

use crate::error::Result;

/// A message for external listeners.
///
/// On the wire it is `{"type": "event" | "property_update", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    /// Something happened on or to a speaker, including command outcomes
    Event(ApiEvent),
    /// A device's property snapshot was (re)fetched
    PropertyUpdate { ip: IpAddr, properties: PropertyMap },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Event(_) => "event",
            Notification::PropertyUpdate { .. } => "property_update",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Anything that accepts notifications without making the caller wait
pub trait NotificationSink: Send + Sync {
    /// Hand over one notification. Must not block; delivery is best-effort.
    fn publish(&self, notification: Notification);
}
