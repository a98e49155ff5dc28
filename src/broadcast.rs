//! Announcing registry changes to the rest of the system.
//!
//! The real message bus belongs to the host platform; the core only needs
//! something that can publish a named notification. Two implementations
//! ship with the crate: one that logs, and an in-process channel.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::info;

/// Process-wide broadcast of named notifications
pub trait ChangeNotifier: Send + Sync {
    /// Publish `name` on the message center `center`
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be delivered
    fn publish(&self, center: &str, name: &str) -> Result<()>;
}

/// A published notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message center the notification was posted on
    pub center: String,
    /// Notification name
    pub name: String,
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn publish(&self, center: &str, name: &str) -> Result<()> {
        info!(center, name, "Broadcasting notification");
        Ok(())
    }
}

/// Delivers notifications to an in-process receiver
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: Sender<Notification>,
}

impl ChannelNotifier {
    /// A notifier and the receiving end of its channel
    #[must_use]
    pub fn new() -> (Self, Receiver<Notification>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn publish(&self, center: &str, name: &str) -> Result<()> {
        self.sender
            .send(Notification {
                center: center.to_string(),
                name: name.to_string(),
            })
            .context("Notification receiver has been dropped")
    }
}
