//! [`NotificationSink`] implementations.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{info, warn};

use haulmark_core::traits::{Notification, NotificationSink, Severity};

/// Writes every notification to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            severity => info!(
                %severity,
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}

/// Forwards notifications to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means nobody is listening anymore.
        let _ = self.sender.send(notification);
    }
}

/// Collects notifications in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every notification received so far.
    pub fn all(&self) -> Vec<Notification> {
        self.buffer().clone()
    }

    /// Remove and return every notification received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.buffer())
    }

    /// Number of notifications received.
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Whether nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Number of notifications with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.buffer()
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.buffer().push(notification);
    }
}
