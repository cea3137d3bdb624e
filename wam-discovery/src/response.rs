//! Advertisement parsing
//!
//! Turns one raw SSDP answer into a [`Device`], or rejects it when nothing in
//! the payload points at a WAM speaker.

use std::net::SocketAddr;

use crate::config::DEFAULT_CONTROL_PORT;
use crate::{Device, DiscoverySource};

/// Case-insensitive substrings, at least one of which must appear in a payload.
pub const VENDOR_INDICATORS: &[&str] = &["WAM", "SAMSUNG", "SPEAKER", "ALLSHARE", "MEDIARENDERER"];

/// Control ports recognised in a payload when LOCATION carries no explicit port.
pub const KNOWN_CONTROL_PORTS: &[u16] = &[55001, 55002, 7676, 8001, 8080, 19999, 52345];

/// Placeholder name for a device that did not advertise one
pub fn placeholder_name(ip: &str) -> String {
    format!("WAM Speaker at {}", ip)
}

/// Placeholder model for a device that did not advertise one
pub const PLACEHOLDER_MODEL: &str = "Samsung WAM Speaker";

/// Parse an advertisement received from `source` in answer to `search_target`.
///
/// Returns `None` when the payload carries no vendor indicator. The device IP is
/// always the transport source address; addresses inside the payload are only
/// consulted for the port.
pub fn parse_advertisement(payload: &str, source: SocketAddr, search_target: &str) -> Option<Device> {
    if !has_vendor_indicator(payload) {
        return None;
    }

    let ip_address = source.ip().to_string();
    let mut location = None;
    let mut server = None;
    let mut friendly_name = None;
    let mut model_name = None;

    for line in payload.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        } else if let Some(value) = extract_header_value(line, "FRIENDLYNAME:") {
            friendly_name = Some(value);
        } else if let Some(value) = extract_header_value(line, "MODELNAME:") {
            model_name = Some(value);
        }
    }

    let port = location
        .as_deref()
        .and_then(port_from_location)
        .or_else(|| known_port_in(payload))
        .unwrap_or(DEFAULT_CONTROL_PORT);

    Some(Device {
        name: non_empty(friendly_name).unwrap_or_else(|| placeholder_name(&ip_address)),
        model_name: non_empty(model_name).unwrap_or_else(|| PLACEHOLDER_MODEL.to_string()),
        ip_address,
        port,
        server: non_empty(server),
        source: DiscoverySource::Ssdp {
            search_target: search_target.to_string(),
        },
    })
}

fn has_vendor_indicator(payload: &str) -> bool {
    let upper = payload.to_uppercase();
    VENDOR_INDICATORS.iter().any(|indicator| upper.contains(indicator))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Extract the port from a `scheme://host:port/...` URL
fn port_from_location(location: &str) -> Option<u16> {
    let authority = location.split("://").nth(1)?.split('/').next()?;
    let (host, port) = authority.rsplit_once(':')?;
    if host.is_empty() || host.contains(':') {
        return None;
    }
    port.parse().ok()
}

/// First known control port that appears as `:<port>` in the payload
fn known_port_in(payload: &str) -> Option<u16> {
    KNOWN_CONTROL_PORTS
        .iter()
        .copied()
        .find(|port| contains_port_token(payload, *port))
}

fn contains_port_token(payload: &str, port: u16) -> bool {
    let token = format!(":{}", port);
    payload.match_indices(&token).any(|(idx, _)| {
        payload[idx + token.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_digit())
    })
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line.is_char_boundary(header.len()) && line[..header.len()].eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}
