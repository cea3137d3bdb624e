//! Notification delivery for wam-sdk
//!
//! Speaker events and property updates are pushed to any number of listeners
//! through a [`NotificationHub`]. Delivery is fire-and-forget: a slow or
//! closed listener never holds up the others.
//!
//! ```rust
//! use wam_event_manager::{Notification, NotificationConfig, NotificationHub};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let hub = NotificationHub::new(NotificationConfig::default()).unwrap();
//! let mut listener = hub.subscribe();
//!
//! hub.broadcast(Notification::PropertyUpdate {
//!     ip: "10.0.0.5".parse().unwrap(),
//!     properties: Default::default(),
//! });
//!
//! let message = listener.recv().await.unwrap();
//! assert_eq!(message.kind(), "property_update");
//! # }
//! ```

pub mod error;
pub mod history;
pub mod hub;
pub mod notification;

pub use error::{EventManagerError, Result};
pub use history::{EventHistory, DEFAULT_EVENT_LIMIT, MAX_EVENT_LIMIT};
pub use hub::{ListenerId, NotificationConfig, NotificationHub, NotificationSubscription, PublishReport};
pub use notification::{Notification, NotificationSink};
