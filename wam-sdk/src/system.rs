//! WamSystem - Main entry point for the SDK
//!
//! Ties discovery, the device registry, command dispatch and notifications
//! together behind one owned object.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use wam_api::{Ack, ApiCall, ApiEvent, DeviceClient, PropertyMap};
use wam_discovery::{Device, DiscoveryEngine};
use wam_event_manager::{Notification, NotificationHub, NotificationSink, NotificationSubscription};
use wam_state::{ConnectResult, DeviceInfo, DeviceRegistry, DeviceSummary, GroupRecord, StateError};

use crate::config::SystemConfig;
use crate::dispatcher::{CommandDispatcher, DispatchMode, GroupDispatchResult};
use crate::error::{Result, SdkError};

/// Result of [`WamSystem::dispatch_command`]
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommandOutcome {
    Device { ip: IpAddr, ack: Ack },
    Group(GroupDispatchResult),
}

/// Connected-device overview, answered to listener pings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub connected_devices: usize,
    pub devices: Vec<IpAddr>,
}

/// Main system entry point
///
/// The device client is supplied by the caller; everything else is owned here.
/// [`disconnect_all`](WamSystem::disconnect_all) tears the system down to its
/// freshly created state.
///
/// # Example
///
/// ```rust,ignore
/// use wam_sdk::{DispatchMode, WamSystem};
///
/// let system = WamSystem::new(my_client)?;
///
/// for device in system.discover().await? {
///     system.connect_discovered(&device).await?;
/// }
///
/// system.dispatch_command("10.0.0.5", "volume", Some("15"), DispatchMode::Individual).await?;
/// system.dispatch_command("10.0.0.5", "pause", None, DispatchMode::Group).await?;
/// ```
pub struct WamSystem<C: DeviceClient> {
    config: SystemConfig,
    discovery: DiscoveryEngine,
    registry: Arc<DeviceRegistry<C>>,
    notifications: NotificationHub,
    dispatcher: CommandDispatcher<C>,
}

impl<C: DeviceClient> WamSystem<C> {
    pub fn new(client: C) -> Result<Self> {
        Self::with_config(client, SystemConfig::default())
    }

    pub fn with_config(client: C, config: SystemConfig) -> Result<Self> {
        config.validate()?;

        let discovery = DiscoveryEngine::new(config.discovery.clone())?;
        let registry = Arc::new(DeviceRegistry::with_config(Arc::new(client), config.registry.clone()));
        let notifications = NotificationHub::new(config.notifications.clone())?;
        let sink: Arc<dyn NotificationSink> = Arc::new(notifications.clone());
        let dispatcher = CommandDispatcher::new(Arc::clone(&registry), sink);

        Ok(Self {
            config,
            discovery,
            registry,
            notifications,
            dispatcher,
        })
    }

    /// Run one discovery round. Found devices are not connected automatically.
    pub async fn discover(&self) -> Result<Vec<Device>> {
        Ok(self.discovery.discover().await?)
    }

    /// Run one discovery round with a custom listen window per service type.
    /// The configured discovery settings apply otherwise.
    pub async fn discover_with_timeout(&self, timeout: Duration) -> Result<Vec<Device>> {
        let config = self.config.discovery.clone().with_timeout(timeout);
        Ok(DiscoveryEngine::new(config)?.discover().await?)
    }

    /// Connect to `ip` on the configured control port
    pub async fn connect_device(&self, ip: &str) -> Result<ConnectResult> {
        self.connect_device_on(parse_ip(ip)?, self.config.control_port).await
    }

    /// Connect to a device found by [`discover`](WamSystem::discover), on its
    /// advertised port
    pub async fn connect_discovered(&self, device: &Device) -> Result<ConnectResult> {
        self.connect_device_on(parse_ip(&device.ip_address)?, device.port).await
    }

    pub async fn connect_device_on(&self, ip: IpAddr, port: u16) -> Result<ConnectResult> {
        let result = self.registry.connect(ip, port).await?;
        if !result.already_connected {
            self.publish_properties(ip);
        }
        Ok(result)
    }

    pub fn get_device_properties(&self, ip: &str) -> Result<PropertyMap> {
        let ip = parse_ip(ip)?;
        self.registry.properties(ip).ok_or(SdkError::DeviceNotConnected(ip))
    }

    pub fn get_device_info(&self, ip: &str) -> Result<DeviceInfo> {
        let ip = parse_ip(ip)?;
        self.registry.info(ip).ok_or(SdkError::DeviceNotConnected(ip))
    }

    /// Re-fetch the snapshot of `ip` and push it to listeners
    pub async fn refresh_device(&self, ip: &str) -> Result<PropertyMap> {
        let ip = parse_ip(ip)?;
        let properties = self.registry.refresh_state(ip).await.map_err(|e| match e {
            StateError::NotFound(ip) => SdkError::DeviceNotConnected(ip),
            other => other.into(),
        })?;
        self.notifications.publish(Notification::PropertyUpdate {
            ip,
            properties: properties.clone(),
        });
        Ok(properties)
    }

    /// Send a logical command to `target`, or to every member of its group
    pub async fn dispatch_command(
        &self,
        target: &str,
        command: &str,
        value: Option<&str>,
        mode: DispatchMode,
    ) -> Result<CommandOutcome> {
        let ip = parse_ip(target)?;
        match mode {
            DispatchMode::Individual => {
                let ack = self.dispatcher.dispatch_to_device(ip, command, value).await?;
                Ok(CommandOutcome::Device { ip, ack })
            }
            DispatchMode::Group => Ok(CommandOutcome::Group(
                self.dispatcher.dispatch_to_group(ip, command, value).await?,
            )),
        }
    }

    /// Send a caller-built call that is not in the command table
    pub async fn send_api_call(&self, target: &str, call: &ApiCall) -> Result<Ack> {
        self.dispatcher.send_call(parse_ip(target)?, call).await
    }

    pub fn list_devices(&self) -> Vec<DeviceSummary> {
        self.registry.list()
    }

    pub fn list_groups(&self) -> Vec<GroupRecord> {
        self.registry.groups()
    }

    pub async fn disconnect(&self, ip: &str) -> Result<()> {
        let ip = parse_ip(ip)?;
        self.registry.disconnect(ip).await.map_err(|e| match e {
            StateError::NotFound(ip) => SdkError::DeviceNotConnected(ip),
            other => other.into(),
        })
    }

    /// Disconnect everything. Returns the number of devices that were connected.
    pub async fn disconnect_all(&self) -> usize {
        self.registry.disconnect_all().await
    }

    pub fn subscribe(&self) -> NotificationSubscription {
        self.notifications.subscribe()
    }

    /// Forward a device event to listeners
    pub fn publish_event(&self, event: ApiEvent) {
        self.notifications.publish(Notification::Event(event));
    }

    /// Up to `limit` recent events, newest first, including command outcomes.
    /// `limit` is clamped to `1..=1000`; callers without a preference pass
    /// [`DEFAULT_EVENT_LIMIT`](crate::DEFAULT_EVENT_LIMIT).
    pub fn recent_events(&self, limit: usize) -> Vec<ApiEvent> {
        self.notifications.recent_events(limit)
    }

    pub fn status(&self) -> SystemStatus {
        let devices = self.registry.ips();
        SystemStatus {
            connected_devices: devices.len(),
            devices,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Get the registry for advanced usage
    pub fn registry(&self) -> &Arc<DeviceRegistry<C>> {
        &self.registry
    }

    pub fn notifications(&self) -> &NotificationHub {
        &self.notifications
    }

    fn publish_properties(&self, ip: IpAddr) {
        if let Some(properties) = self.registry.properties(ip) {
            self.notifications.publish(Notification::PropertyUpdate { ip, properties });
        }
    }
}

fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.trim().parse().map_err(|_| SdkError::InvalidIpAddress(ip.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip(" 10.0.0.5 ").unwrap(), "10.0.0.5".parse::<IpAddr>().unwrap());
        assert!(matches!(parse_ip("speaker.local"), Err(SdkError::InvalidIpAddress(_))));
    }

    #[test]
    fn test_status_serialization() {
        let status = SystemStatus {
            connected_devices: 1,
            devices: vec!["10.0.0.5".parse().unwrap()],
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["connected_devices"], 1);
        assert_eq!(value["devices"][0], "10.0.0.5");
    }
}
