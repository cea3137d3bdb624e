use std::net::IpAddr;

use thiserror::Error;
use wam_api::{ApiError, CommandError};

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] wam_discovery::DiscoveryError),

    #[error("State management error: {0}")]
    StateError(#[from] wam_state::StateError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Event manager error: {0}")]
    EventManager(#[from] wam_event_manager::EventManagerError),

    #[error("Device not connected: {0}")]
    DeviceNotConnected(IpAddr),

    #[error("Device {0} is not in any group")]
    GroupNotFound(IpAddr),

    #[error("Command failed on {ip}: {source}")]
    CommandFailed {
        ip: IpAddr,
        #[source]
        source: ApiError,
    },

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, SdkError>;
