//! Fan-out of notifications to subscribed listeners
//!
//! Each listener owns a bounded channel. Publishing never waits: a full
//! channel loses that one message, and a listener whose receiver is gone is
//! removed once the pass over all listeners has finished. Every event is also
//! kept in a bounded [`EventHistory`] for later queries.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use wam_api::ApiEvent;

use crate::error::{EventManagerError, Result};
use crate::history::{EventHistory, MAX_EVENT_LIMIT};
use crate::notification::{Notification, NotificationSink};

/// Identifier of a subscribed listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Configuration for a [`NotificationHub`]
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Messages buffered per listener before new ones are dropped for it
    /// Default: 64
    pub listener_buffer: usize,

    /// Events kept for [`NotificationHub::recent_events`]
    /// Default: 1000
    pub history_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            listener_buffer: 64,
            history_capacity: MAX_EVENT_LIMIT,
        }
    }
}

impl NotificationConfig {
    pub fn with_listener_buffer(mut self, size: usize) -> Self {
        self.listener_buffer = size;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.listener_buffer == 0 {
            return Err(EventManagerError::Configuration(
                "listener_buffer must be greater than 0".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(EventManagerError::Configuration(
                "history_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// What happened during one [`NotificationHub::broadcast`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    /// Listeners whose buffer was full; they stay subscribed
    pub dropped: usize,
    /// Listeners found closed and unsubscribed
    pub removed: usize,
}

/// Receiving end of a subscription
#[derive(Debug)]
pub struct NotificationSubscription {
    id: ListenerId,
    receiver: mpsc::Receiver<Notification>,
}

impl NotificationSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next notification; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        self.receiver.try_recv().ok()
    }
}

/// Shared, cloneable hub of listeners
#[derive(Clone)]
pub struct NotificationHub {
    listeners: Arc<DashMap<ListenerId, mpsc::Sender<Notification>>>,
    history: Arc<EventHistory>,
    next_id: Arc<AtomicU64>,
    config: NotificationConfig,
}

impl NotificationHub {
    pub fn new(config: NotificationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            listeners: Arc::new(DashMap::new()),
            history: Arc::new(EventHistory::new(config.history_capacity)),
            next_id: Arc::new(AtomicU64::new(1)),
            config,
        })
    }

    pub fn subscribe(&self) -> NotificationSubscription {
        let (sender, receiver) = mpsc::channel(self.config.listener_buffer);
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, sender);
        tracing::debug!("Subscribed {}", id);
        NotificationSubscription { id, receiver }
    }

    pub fn unsubscribe(&self, id: ListenerId) -> Result<()> {
        self.listeners
            .remove(&id)
            .map(|_| tracing::debug!("Unsubscribed {}", id))
            .ok_or(EventManagerError::ListenerNotFound(id))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Up to `limit` recorded events, newest first. `limit` is clamped to
    /// `1..=1000`.
    pub fn recent_events(&self, limit: usize) -> Vec<ApiEvent> {
        self.history.recent(limit)
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    /// Offer `notification` to every listener without waiting on any of them.
    /// Events are recorded in the history even when nobody is listening.
    pub fn broadcast(&self, notification: Notification) -> PublishReport {
        if let Notification::Event(event) = &notification {
            self.history.record(event.clone());
        }

        let snapshot: Vec<(ListenerId, mpsc::Sender<Notification>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut closed = Vec::new();

        for (id, sender) in snapshot {
            match sender.try_send(notification.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("{} is lagging, dropped a {} notification", id, notification.kind());
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        for id in closed {
            if self.listeners.remove(&id).is_some() {
                tracing::warn!("Removed closed {}", id);
                report.removed += 1;
            }
        }

        report
    }
}

impl NotificationSink for NotificationHub {
    fn publish(&self, notification: Notification) {
        self.broadcast(notification);
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("listeners", &self.listeners.len())
            .field("history", &self.history.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(n: i64) -> Notification {
        let mut properties = wam_api::PropertyMap::new();
        properties.insert("volume".to_string(), n.into());
        Notification::PropertyUpdate {
            ip: "10.0.0.5".parse().unwrap(),
            properties,
        }
    }

    fn event(method: &str) -> Notification {
        Notification::Event(wam_api::ApiEvent {
            speaker_ip: "10.0.0.5".to_string(),
            api_type: wam_api::ApiType::Uic,
            method: method.to_string(),
            success: true,
            data: serde_json::Value::Null,
            err_msg: None,
        })
    }

    #[test]
    fn test_zero_history_rejected() {
        let config = NotificationConfig::default().with_history_capacity(0);
        assert!(NotificationHub::new(config).is_err());
    }

    #[test]
    fn test_only_events_are_recorded() {
        let hub = NotificationHub::new(NotificationConfig::default()).unwrap();

        hub.broadcast(update(1));
        hub.broadcast(event("Play"));
        hub.broadcast(event("Pause"));

        let recent: Vec<String> = hub.recent_events(10).into_iter().map(|e| e.method).collect();
        assert_eq!(recent, vec!["Pause", "Play"]);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = NotificationConfig::default().with_listener_buffer(0);
        assert!(matches!(
            NotificationHub::new(config),
            Err(EventManagerError::Configuration(_))
        ));
    }

    #[test]
    fn test_unsubscribe_unknown_listener() {
        let hub = NotificationHub::new(NotificationConfig::default()).unwrap();
        let sub = hub.subscribe();
        hub.unsubscribe(sub.id()).unwrap();
        assert!(matches!(
            hub.unsubscribe(sub.id()),
            Err(EventManagerError::ListenerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_every_listener_receives() {
        let hub = NotificationHub::new(NotificationConfig::default()).unwrap();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let report = hub.broadcast(update(1));

        assert_eq!(report.delivered, 2);
        assert_eq!(a.recv().await, Some(update(1)));
        assert_eq!(b.recv().await, Some(update(1)));
    }

    #[tokio::test]
    async fn test_full_listener_does_not_block_others() {
        let hub = NotificationHub::new(NotificationConfig::default().with_listener_buffer(1)).unwrap();
        let _slow = hub.subscribe();
        let mut fast = hub.subscribe();

        hub.broadcast(update(1));
        assert_eq!(fast.recv().await, Some(update(1)));

        let report = hub.broadcast(update(2));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(fast.recv().await, Some(update(2)));
        assert_eq!(hub.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_closed_listener_removed_after_pass() {
        let hub = NotificationHub::new(NotificationConfig::default()).unwrap();
        let gone = hub.subscribe();
        let mut alive = hub.subscribe();
        drop(gone);

        let report = hub.broadcast(update(3));

        assert_eq!(report.removed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(alive.try_recv(), Some(update(3)));
    }
}
