//! WAM speaker discovery library
//!
//! This crate finds Samsung Wireless Audio Multiroom (WAM) speakers on a local
//! network. It multicasts SSDP M-SEARCH probes for several service types at
//! once and, when nobody answers, falls back to a bounded TCP scan of the
//! local /24.
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn run() -> wam_discovery::Result<()> {
//! // Discover all speakers with the default 3-second window
//! let devices = wam_discovery::get().await?;
//! for device in devices {
//!     println!("Found {} at {}:{}", device.name, device.ip_address, device.port);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Results never contain two devices with the same `(ip, port)` and are
//! always sorted by IP.

mod config;
mod discovery;
mod error;
pub mod response;
pub mod scan;
mod ssdp;

pub use config::{
    DiscoveryConfig, DEFAULT_BANNER_MARKERS, DEFAULT_CONTROL_PORT, DEFAULT_HTTP_PROBE_PORTS,
    DEFAULT_SCAN_PORTS, DEFAULT_SERVICE_TYPES, MAX_SCAN_HOSTS,
};
pub use discovery::{finalize_results, DiscoveryEngine};
pub use error::{DiscoveryError, Result};

use serde::Serialize;
use std::time::Duration;

/// A speaker candidate produced by one discovery round.
///
/// Descriptors are never updated; a later round produces fresh ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// IP address the answer came from
    pub ip_address: String,
    /// Control port of the speaker API
    pub port: u16,
    /// Advertised name, or a placeholder embedding the IP
    pub name: String,
    /// Advertised model, or a placeholder
    pub model_name: String,
    /// SERVER header of the advertisement, if any
    pub server: Option<String>,
    /// How the device was found
    pub source: DiscoverySource,
}

/// How a [`Device`] was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Answer to an SSDP M-SEARCH for `search_target`
    Ssdp { search_target: String },
    /// Open port found by the fallback scan. `banner_confirmed` is set when an
    /// HTTP banner carried a vendor marker.
    PortScan { banner_confirmed: bool },
}

/// Discover speakers with the default configuration.
pub async fn get() -> Result<Vec<Device>> {
    DiscoveryEngine::new(DiscoveryConfig::default())?.discover().await
}

/// Discover speakers with a custom listen window per service type.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// # async fn run() -> wam_discovery::Result<()> {
/// let devices = wam_discovery::get_with_timeout(Duration::from_secs(5)).await?;
/// println!("{} speaker(s)", devices.len());
/// # Ok(())
/// # }
/// ```
pub async fn get_with_timeout(timeout: Duration) -> Result<Vec<Device>> {
    DiscoveryEngine::new(DiscoveryConfig::default().with_timeout(timeout))?
        .discover()
        .await
}
