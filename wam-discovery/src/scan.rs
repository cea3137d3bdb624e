//! TCP port-scan fallback
//!
//! Used only when the multicast phase comes back empty. Walks the first
//! addresses of the local /24 and tries each known control port. An open port
//! is enough to report a candidate; HTTP-capable ports additionally get a
//! `GET /` whose body may confirm the vendor.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use futures::future::join_all;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::DiscoveryConfig;
use crate::{Device, DiscoverySource};

/// Determine the local IPv4 address used for outbound traffic.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V4(addr) if !addr.ip().is_unspecified() => Some(*addr.ip()),
        _ => None,
    }
}

/// Host addresses of the /24 containing `local`, at most `limit` of them.
///
/// Addresses past the limit are never returned, so they are never probed.
pub fn scan_targets(local: Ipv4Addr, limit: usize) -> Vec<Ipv4Addr> {
    let [a, b, c, _] = local.octets();
    (1..=254u8).map(|d| Ipv4Addr::new(a, b, c, d)).take(limit).collect()
}

/// Probe every `(host, port)` pair concurrently and return the open ones.
///
/// At most `config.max_scan_hosts` (never more than 50) hosts are considered.
pub async fn scan_hosts(hosts: &[Ipv4Addr], config: &DiscoveryConfig) -> Vec<Device> {
    let limit = config.scan_host_limit();
    let probes = hosts
        .iter()
        .take(limit)
        .flat_map(|ip| config.scan_ports.iter().map(move |port| (*ip, *port)))
        .map(|(ip, port)| probe(ip, port, config));

    let found: Vec<Device> = join_all(probes).await.into_iter().flatten().collect();

    tracing::debug!(
        "Port scan probed {} host(s), {} open port(s)",
        hosts.len().min(limit),
        found.len()
    );

    found
}

/// Scan the local subnet. Returns nothing when no local address can be found.
pub(crate) async fn scan_local_subnet(config: &DiscoveryConfig) -> Vec<Device> {
    let Some(local) = local_ipv4() else {
        tracing::warn!("Could not determine local IPv4 address, skipping port scan");
        return Vec::new();
    };

    let targets = scan_targets(local, config.scan_host_limit());
    tracing::info!("Multicast found nothing, scanning {} address(es) near {}", targets.len(), local);
    scan_hosts(&targets, config).await
}

async fn probe(ip: Ipv4Addr, port: u16, config: &DiscoveryConfig) -> Option<Device> {
    let mut stream = match timeout(config.connect_timeout, TcpStream::connect((ip, port))).await {
        Ok(Ok(stream)) => stream,
        _ => return None,
    };

    let banner_confirmed = if config.http_probe_ports.contains(&port) {
        banner_matches(&mut stream, ip, config.connect_timeout, &config.banner_markers).await
    } else {
        false
    };

    tracing::debug!("Open port {}:{} (banner confirmed: {})", ip, port, banner_confirmed);

    Some(Device {
        ip_address: ip.to_string(),
        port,
        name: format!("Samsung WAM Speaker at {}", ip),
        model_name: format!("WAM on port {}", port),
        server: None,
        source: DiscoverySource::PortScan { banner_confirmed },
    })
}

/// Send a minimal HTTP request and look for a vendor marker in the reply
async fn banner_matches(stream: &mut TcpStream, ip: Ipv4Addr, limit: Duration, markers: &[String]) -> bool {
    let request = format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", ip);
    if stream.write_all(request.as_bytes()).await.is_err() {
        return false;
    }

    let mut buffer = [0u8; 1024];
    let size = match timeout(limit, stream.read(&mut buffer)).await {
        Ok(Ok(size)) => size,
        _ => return false,
    };

    let body = String::from_utf8_lossy(&buffer[..size]).to_lowercase();
    markers.iter().any(|marker| body.contains(marker.as_str()))
}
