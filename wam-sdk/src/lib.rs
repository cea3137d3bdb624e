//! Discover, track and control Samsung WAM speakers
//!
//! [`WamSystem`] is the entry point. It finds speakers on the local network,
//! keeps a registry of the ones it is connected to, sends commands to a single
//! speaker or fans them out to a whole group, and pushes events and property
//! updates to subscribed listeners.
//!
//! The transport that actually talks to a speaker is not part of this crate;
//! supply one by implementing [`DeviceClient`].

mod config;
mod dispatcher;
mod error;
pub mod logging;
mod system;

pub use config::SystemConfig;
pub use dispatcher::{CommandDispatcher, DispatchMode, GroupDispatchResult, MemberOutcome};
pub use error::{Result, SdkError};
pub use system::{CommandOutcome, SystemStatus, WamSystem};

// Re-export the types callers need from the component crates
pub use wam_api::{Ack, ApiCall, ApiError, ApiEvent, ApiType, ArgValue, CommandError, DeviceClient, PropertyMap};
pub use wam_discovery::{Device, DiscoveryConfig, DiscoverySource};
pub use wam_event_manager::{
    Notification, NotificationConfig, NotificationSubscription, DEFAULT_EVENT_LIMIT, MAX_EVENT_LIMIT,
};
pub use wam_state::{ConnectResult, DeviceInfo, DeviceSummary, GroupId, GroupRecord, RegistryConfig};
