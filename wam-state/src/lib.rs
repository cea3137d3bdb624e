//! Device registry and group tracking for wam-sdk
//!
//! [`DeviceRegistry`] owns one record per connected speaker, keyed by IP, and
//! the [`GroupManager`] table derived from those records' property snapshots.
//! It reaches devices only through a [`wam_api::DeviceClient`].
//!
//! Snapshot fields are found through ordered synonym-key lists
//! ([`synonyms`]), since firmware versions name the same property differently.

mod error;
pub mod groups;
pub mod model;
mod registry;
pub mod synonyms;

pub use error::{Result, StateError};
pub use groups::{group_id_from_snapshot, GroupManager};
pub use model::{ConnectResult, DeviceInfo, DeviceRecord, DeviceSummary, GroupId, GroupRecord};
pub use registry::{DeviceRegistry, RegistryConfig, PLACEHOLDER_MODEL};
