//! The device-control seam.
//!
//! Everything above this crate talks to speakers only through
//! [`DeviceClient`]. The real transport lives outside the workspace; tests
//! supply a mock.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::call::{Ack, ApiCall};
use crate::error::Result;

/// Property snapshot fetched from a device, keyed by property name
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Trait for clients able to control WAM speakers.
///
/// A client hands out an opaque [`Handle`](DeviceClient::Handle) per
/// connection. Handles are cloned freely, so they should be cheap (an id or an
/// `Arc`). Every method is expected to bound its own network waits.
///
/// # Example
///
/// ```
/// use std::net::IpAddr;
/// use async_trait::async_trait;
/// use wam_api::{Ack, ApiCall, DeviceClient, PropertyMap, Result};
///
/// struct EchoClient;
///
/// #[async_trait]
/// impl DeviceClient for EchoClient {
///     type Handle = IpAddr;
///
///     async fn connect(&self, ip: IpAddr, _port: u16) -> Result<IpAddr> { Ok(ip) }
///     async fn disconnect(&self, _handle: &IpAddr) -> Result<()> { Ok(()) }
///     async fn send_command(&self, _handle: &IpAddr, call: &ApiCall) -> Result<Ack> {
///         Ok(Ack::new(call.method.clone()))
///     }
///     async fn fetch_state(&self, _handle: &IpAddr) -> Result<PropertyMap> {
///         Ok(PropertyMap::new())
///     }
/// }
/// ```
#[async_trait]
pub trait DeviceClient: Send + Sync + 'static {
    /// Connection handle returned by [`connect`](DeviceClient::connect)
    type Handle: Clone + Send + Sync + 'static;

    /// Open a control connection to the speaker at `ip:port`
    async fn connect(&self, ip: IpAddr, port: u16) -> Result<Self::Handle>;

    /// Close a connection. The handle must not be used afterwards.
    async fn disconnect(&self, handle: &Self::Handle) -> Result<()>;

    /// Send one encoded call and wait for its acknowledgement
    async fn send_command(&self, handle: &Self::Handle, call: &ApiCall) -> Result<Ack>;

    /// Fetch the device's current property snapshot
    async fn fetch_state(&self, handle: &Self::Handle) -> Result<PropertyMap>;
}
