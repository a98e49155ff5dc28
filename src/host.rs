//! Registration of commands with the host event dispatcher.
//!
//! The dispatcher decides when a command's trigger fires. It learns about
//! commands by listener name, and calls back with an [`Event`] carrying
//! that name.
//!
//! [`Event`]: crate::command::Event

use crate::command::Command;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

/// The host side of event dispatch
pub trait ListenerHost: Send + Sync {
    /// Make `command` available under its listener name
    fn register(&self, command: &Command);

    /// Withdraw the listener `listener_name`
    fn unregister(&self, listener_name: &str);
}

/// Host that only logs registrations
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl ListenerHost for LoggingHost {
    fn register(&self, command: &Command) {
        debug!(
            listener = command.listener_name(),
            title = command.display_name(),
            "Registered listener"
        );
    }

    fn unregister(&self, listener_name: &str) {
        debug!(listener = listener_name, "Unregistered listener");
    }
}

/// Host that remembers registrations, for inspection
#[derive(Debug, Default)]
pub struct RecordingHost {
    listeners: Mutex<BTreeMap<String, String>>,
    registrations: Mutex<usize>,
}

impl RecordingHost {
    /// An empty host
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered listener names mapped to their titles
    #[must_use]
    pub fn listeners(&self) -> BTreeMap<String, String> {
        self.listeners.lock().clone()
    }

    /// Total `register` calls so far
    #[must_use]
    pub fn registrations(&self) -> usize {
        *self.registrations.lock()
    }
}

impl ListenerHost for RecordingHost {
    fn register(&self, command: &Command) {
        self.listeners.lock().insert(
            command.listener_name().to_string(),
            command.display_name().to_string(),
        );
        *self.registrations.lock() += 1;
    }

    fn unregister(&self, listener_name: &str) {
        self.listeners.lock().remove(listener_name);
    }
}
