//! Status notifications
//!
//! Panels, sirens and loggers learn about committed changes by draining the
//! controller's outbox rather than by registering callbacks.

use heapless::Deque;

use crate::status::AlarmStatus;

/// Outbox capacity
pub const OUTBOX_CAPACITY: usize = 16;

/// A committed change worth telling listeners about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Alarm status was written (possibly with an unchanged value)
    AlarmStatus(AlarmStatus),
    /// A camera frame was classified
    CatDetected(bool),
    /// One or more sensors changed activation or membership
    SensorsChanged,
}

/// Bounded notification queue
///
/// When full, the oldest notification is dropped so the most recent state is
/// always delivered.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    queue: Deque<Notification, OUTBOX_CAPACITY>,
    dropped: u32,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Queue a notification, evicting the oldest if full
    pub fn push(&mut self, notification: Notification) {
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped = self.dropped.saturating_add(1);
            warn!("Outbox full, dropped oldest notification");
        }
        // Room was made above
        let _ = self.queue.push_back(notification);
    }

    /// Take the oldest queued notification
    pub fn pop(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Notifications evicted since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
