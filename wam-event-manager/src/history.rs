//! Bounded history of recent speaker events

use std::collections::VecDeque;

use parking_lot::Mutex;
use wam_api::ApiEvent;

/// Events returned when a caller names no limit
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// Largest limit a caller may ask for; also the default capacity
pub const MAX_EVENT_LIMIT: usize = 1000;

/// Ring buffer of the most recent events. The oldest event is evicted once
/// `capacity` is reached.
#[derive(Debug)]
pub struct EventHistory {
    events: Mutex<VecDeque<ApiEvent>>,
    capacity: usize,
}

impl EventHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_EVENT_LIMIT))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, event: ApiEvent) {
        let mut events = self.events.lock();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Up to `limit` events, newest first. `limit` is clamped to
    /// `1..=MAX_EVENT_LIMIT`.
    pub fn recent(&self, limit: usize) -> Vec<ApiEvent> {
        let limit = limit.clamp(1, MAX_EVENT_LIMIT);
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
