//! Configuration for [`WamSystem`](crate::WamSystem)

use wam_discovery::{DiscoveryConfig, DEFAULT_CONTROL_PORT};
use wam_event_manager::NotificationConfig;
use wam_state::RegistryConfig;

use crate::error::{Result, SdkError};

/// Settings for every component of a [`WamSystem`](crate::WamSystem)
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub discovery: DiscoveryConfig,
    pub registry: RegistryConfig,
    pub notifications: NotificationConfig,

    /// Port used by `connect_device` when none is given
    /// Default: 55001
    pub control_port: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            registry: RegistryConfig::default(),
            notifications: NotificationConfig::default(),
            control_port: DEFAULT_CONTROL_PORT,
        }
    }
}

impl SystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short discovery window, no settle delay
    pub fn responsive() -> Self {
        Self {
            discovery: DiscoveryConfig::quick(),
            registry: RegistryConfig::immediate(),
            ..Default::default()
        }
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationConfig) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        self.notifications.validate()?;
        if self.control_port == 0 {
            return Err(SdkError::Configuration(
                "control_port must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
