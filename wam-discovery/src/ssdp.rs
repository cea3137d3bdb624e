//! SSDP (Simple Service Discovery Protocol) client
//!
//! Sends M-SEARCH probes over UDP multicast and yields every datagram that
//! arrives before the listen window closes. Interpreting the payload is left
//! to [`crate::response`]. Not part of the public API.

use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};

/// One datagram received in answer to an M-SEARCH
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpPacket {
    pub payload: String,
    pub source: SocketAddr,
}

/// SSDP client bound to an ephemeral UDP port
pub(crate) struct SsdpClient {
    socket: UdpSocket,
    multicast_addr: SocketAddrV4,
    mx: u8,
    user_agent: String,
}

impl SsdpClient {
    /// Create a new SSDP client configured for multicast search
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::SocketError(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .set_multicast_ttl_v4(config.multicast_ttl)
            .map_err(|e| DiscoveryError::SocketError(format!("Failed to set multicast TTL: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::SocketError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self {
            socket,
            multicast_addr: config.multicast_addr,
            mx: config.mx,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Send an M-SEARCH for `search_target` and listen for `window`
    pub fn search(&self, search_target: &str, window: Duration) -> Result<SsdpResponseIterator<'_>> {
        let request = build_search_request(&self.multicast_addr, self.mx, search_target, &self.user_agent);

        self.socket
            .send_to(request.as_bytes(), self.multicast_addr)
            .map_err(|e| DiscoveryError::SocketError(format!("Failed to send M-SEARCH: {}", e)))?;

        tracing::debug!("Sent M-SEARCH for {}", search_target);

        Ok(SsdpResponseIterator::new(&self.socket, Instant::now() + window))
    }
}

/// Format an M-SEARCH request
fn build_search_request(multicast_addr: &SocketAddrV4, mx: u8, search_target: &str, user_agent: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         USER-AGENT: {}\r\n\
         \r\n",
        multicast_addr, mx, search_target, user_agent
    )
}

/// Iterator over datagrams received until the deadline passes
///
/// Each read is bounded by the time left in the window, so the iterator never
/// blocks past the deadline.
pub(crate) struct SsdpResponseIterator<'a> {
    socket: &'a UdpSocket,
    buffer: [u8; 2048],
    deadline: Instant,
    finished: bool,
}

impl<'a> SsdpResponseIterator<'a> {
    fn new(socket: &'a UdpSocket, deadline: Instant) -> Self {
        Self {
            socket,
            buffer: [0; 2048],
            deadline,
            finished: false,
        }
    }
}

impl<'a> Iterator for SsdpResponseIterator<'a> {
    type Item = Result<SsdpPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            self.finished = true;
            return None;
        }

        if let Err(e) = self.socket.set_read_timeout(Some(remaining)) {
            self.finished = true;
            return Some(Err(DiscoveryError::SocketError(format!(
                "Failed to set read timeout: {}",
                e
            ))));
        }

        match self.socket.recv_from(&mut self.buffer) {
            Ok((size, source)) => Some(Ok(SsdpPacket {
                payload: String::from_utf8_lossy(&self.buffer[..size]).into_owned(),
                source,
            })),
            Err(e) => {
                self.finished = true;
                if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut {
                    None
                } else {
                    Some(Err(DiscoveryError::SocketError(format!("Socket error: {}", e))))
                }
            }
        }
    }
}
