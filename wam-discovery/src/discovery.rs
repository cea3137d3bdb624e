//! Discovery engine
//!
//! A discovery round:
//! 1. Opens one multicast socket per configured service type and sends an
//!    M-SEARCH on each, all at once
//! 2. Listens on every socket for the full window, parsing what arrives
//! 3. Merges the answers in service-type order, first `(ip, port)` wins
//! 4. Falls back to a bounded port scan when nothing was found
//! 5. Returns the devices sorted by IP

use std::collections::HashSet;

use futures::future::join_all;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::response::parse_advertisement;
use crate::scan;
use crate::ssdp::SsdpClient;
use crate::Device;

/// Finds WAM speakers reachable on the local network.
///
/// # Examples
///
/// ```no_run
/// use wam_discovery::{DiscoveryConfig, DiscoveryEngine};
///
/// # async fn run() -> wam_discovery::Result<()> {
/// let engine = DiscoveryEngine::new(DiscoveryConfig::default())?;
/// for device in engine.discover().await? {
///     println!("{} ({}) at {}:{}", device.name, device.model_name, device.ip_address, device.port);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Create an engine after validating `config`
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run one discovery round.
    ///
    /// Fails only when no multicast socket could be set up at all. Individual
    /// unparseable answers and failed scan probes are left out of the result.
    pub async fn discover(&self) -> Result<Vec<Device>> {
        let found = finalize_results(self.multicast_phase().await?);

        if !found.is_empty() || !self.config.fallback_enabled {
            tracing::info!("Discovered {} WAM speaker(s) via SSDP", found.len());
            return Ok(found);
        }

        let scanned = finalize_results(scan::scan_local_subnet(&self.config).await);
        tracing::info!("Discovered {} WAM speaker(s) via port scan", scanned.len());
        Ok(scanned)
    }

    async fn multicast_phase(&self) -> Result<Vec<Device>> {
        let probes = self.config.service_types.iter().map(|search_target| {
            let config = self.config.clone();
            let search_target = search_target.clone();
            tokio::task::spawn_blocking(move || probe_service_type(&config, &search_target))
        });

        let mut found = Vec::new();
        let mut last_error = None;
        let mut any_succeeded = false;

        for (search_target, outcome) in self.config.service_types.iter().zip(join_all(probes).await) {
            match outcome {
                Ok(Ok(devices)) => {
                    any_succeeded = true;
                    tracing::debug!("{} answer(s) for {}", devices.len(), search_target);
                    found.extend(devices);
                }
                Ok(Err(e)) => {
                    tracing::warn!("SSDP probe for {} failed: {}", search_target, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::warn!("SSDP probe task for {} panicked: {}", search_target, e);
                    last_error = Some(DiscoveryError::SocketError(e.to_string()));
                }
            }
        }

        match last_error {
            Some(e) if !any_succeeded => Err(e),
            _ => Ok(found),
        }
    }
}

/// Send one M-SEARCH and collect the matching answers that arrive in time
fn probe_service_type(config: &DiscoveryConfig, search_target: &str) -> Result<Vec<Device>> {
    let client = SsdpClient::new(config)?;
    let mut devices = Vec::new();

    for packet in client.search(search_target, config.timeout)? {
        match packet {
            Ok(packet) => match parse_advertisement(&packet.payload, packet.source, search_target) {
                Some(device) => devices.push(device),
                None => tracing::debug!("Skipping non-WAM answer from {}", packet.source),
            },
            Err(e) => {
                tracing::debug!("Stopped listening for {}: {}", search_target, e);
                break;
            }
        }
    }

    Ok(devices)
}

/// Drop repeated `(ip, port)` pairs, keeping the first, then sort by IP.
///
/// The sort is stable and compares the textual IP, so equal IPs keep their
/// arrival order.
pub fn finalize_results(devices: Vec<Device>) -> Vec<Device> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Device> = devices
        .into_iter()
        .filter(|device| seen.insert((device.ip_address.clone(), device.port)))
        .collect();

    unique.sort_by(|a, b| a.ip_address.cmp(&b.ip_address));
    unique
}
