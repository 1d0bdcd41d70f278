//! Terminal notifications.

use oniswap::{NotificationSink, Severity};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info};

/// A message raised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// When the message stops being worth showing.
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Logs every notification and forwards it to the command driving the session.
#[derive(Debug)]
pub struct TerminalNotifier {
    tx: mpsc::UnboundedSender<Notification>,
    duration: Duration,
}

impl TerminalNotifier {
    /// Notifications sent through the returned receiver stay current for
    /// `duration` after they are raised.
    pub fn new(duration: Duration) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, duration }, rx)
    }
}

impl NotificationSink for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(message, "swap failed"),
            Severity::Success => info!(message, "swap succeeded"),
            Severity::Info => info!(message, "notice"),
        }
        // Nobody listening once the command has returned
        let _ = self.tx.send(Notification {
            message: message.to_string(),
            severity,
            expires_at: Instant::now() + self.duration,
        });
    }
}
