//! Configuration for discovery rounds
//!
//! Controls the SSDP multicast phase (service types, listen window, TTL) and
//! the TCP port-scan fallback that runs when multicast finds nothing.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use crate::error::{DiscoveryError, Result};

/// Default control port of the WAM speaker API.
pub const DEFAULT_CONTROL_PORT: u16 = 55001;

/// Hard upper bound on addresses probed by one fallback scan round.
pub const MAX_SCAN_HOSTS: usize = 50;

/// Service types searched for, in order.
pub const DEFAULT_SERVICE_TYPES: &[&str] = &[
    "urn:schemas-upnp-org:device:MediaRenderer:1",
    "urn:samsung.com:device:WAMSpeaker:1",
    "urn:schemas-upnp-org:service:WAM:1",
    "ssdp:all",
];

/// Ports the fallback scan tries on every candidate address.
pub const DEFAULT_SCAN_PORTS: &[u16] = &[7676, 8001, 8080, 15500, 19999, 52345, 55000, 55001];

/// Scan ports that answer HTTP and get a banner probe after connecting.
pub const DEFAULT_HTTP_PROBE_PORTS: &[u16] = &[7676, 8001, 8080, 19999, 52345];

/// Lowercase substrings in an HTTP banner that confirm a speaker.
pub const DEFAULT_BANNER_MARKERS: &[&str] = &["wam", "samsung", "allshare", "mongoose", "lighttpd"];

/// Configuration for a [`DiscoveryEngine`](crate::DiscoveryEngine)
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Listen window per service type
    /// Default: 3 seconds
    pub timeout: Duration,

    /// SSDP search targets, probed in this order
    pub service_types: Vec<String>,

    /// SSDP multicast group
    /// Default: 239.255.255.250:1900
    pub multicast_addr: SocketAddrV4,

    /// Multicast TTL, kept low so probes stay on the local segment
    /// Default: 2
    pub multicast_ttl: u32,

    /// MX header value (seconds a device may wait before answering)
    /// Default: 3
    pub mx: u8,

    /// USER-AGENT header sent with M-SEARCH
    pub user_agent: String,

    /// Run the TCP port scan when multicast yields nothing
    /// Default: true
    pub fallback_enabled: bool,

    /// Ports probed by the fallback scan
    pub scan_ports: Vec<u16>,

    /// Subset of `scan_ports` that receive an HTTP banner probe
    pub http_probe_ports: Vec<u16>,

    /// Banner substrings that upgrade a scan hit to confirmed
    pub banner_markers: Vec<String>,

    /// Addresses considered per scan round, at most [`MAX_SCAN_HOSTS`]
    /// Default: 50
    pub max_scan_hosts: usize,

    /// Per-attempt TCP connect timeout for the fallback scan
    /// Default: 2 seconds
    pub connect_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            multicast_addr: SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900),
            multicast_ttl: 2,
            mx: 3,
            user_agent: "wam-sdk/1.0 UPnP/1.0".to_string(),
            fallback_enabled: true,
            scan_ports: DEFAULT_SCAN_PORTS.to_vec(),
            http_probe_ports: DEFAULT_HTTP_PROBE_PORTS.to_vec(),
            banner_markers: DEFAULT_BANNER_MARKERS.iter().map(|s| s.to_string()).collect(),
            max_scan_hosts: MAX_SCAN_HOSTS,
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl DiscoveryConfig {
    /// Create a new DiscoveryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Short windows for interactive use
    pub fn quick() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_millis(750),
            ..Default::default()
        }
    }

    /// Multicast only, never scan
    pub fn multicast_only() -> Self {
        Self {
            fallback_enabled: false,
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.timeout == Duration::ZERO {
            return Err(DiscoveryError::Configuration(
                "Discovery timeout must be greater than 0".to_string(),
            ));
        }

        if self.service_types.is_empty() {
            return Err(DiscoveryError::Configuration(
                "At least one service type is required".to_string(),
            ));
        }

        if self.multicast_ttl == 0 {
            return Err(DiscoveryError::Configuration(
                "Multicast TTL must be greater than 0".to_string(),
            ));
        }

        if self.fallback_enabled {
            if self.scan_ports.is_empty() {
                return Err(DiscoveryError::Configuration(
                    "Fallback scan needs at least one port".to_string(),
                ));
            }

            if self.max_scan_hosts == 0 || self.max_scan_hosts > MAX_SCAN_HOSTS {
                return Err(DiscoveryError::Configuration(format!(
                    "Max scan hosts must be between 1 and {}",
                    MAX_SCAN_HOSTS
                )));
            }

            if self.connect_timeout == Duration::ZERO {
                return Err(DiscoveryError::Configuration(
                    "Connect timeout must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_service_types<I, S>(mut self, service_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_types = service_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_scan_ports(mut self, ports: Vec<u16>) -> Self {
        self.scan_ports = ports;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Scan-round host cap, clamped to [`MAX_SCAN_HOSTS`]
    pub(crate) fn scan_host_limit(&self) -> usize {
        self.max_scan_hosts.min(MAX_SCAN_HOSTS)
    }
}
