//! Error types for wam-state

use std::fmt;
use std::net::IpAddr;

use wam_api::ApiError;

/// Result type for wam-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while tracking devices
#[derive(Debug)]
pub enum StateError {
    /// Connecting to or fetching the initial state of a device failed
    Connection { ip: IpAddr, source: ApiError },

    /// No record exists for the device
    NotFound(IpAddr),

    /// Fetching a fresh snapshot of a connected device failed
    Refresh { ip: IpAddr, source: ApiError },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Connection { ip, source } => write!(f, "Failed to connect to {}: {}", ip, source),
            StateError::NotFound(ip) => write!(f, "Device not connected: {}", ip),
            StateError::Refresh { ip, source } => write!(f, "Failed to refresh state of {}: {}", ip, source),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Connection { source, .. } | StateError::Refresh { source, .. } => Some(source),
            StateError::NotFound(_) => None,
        }
    }
}
