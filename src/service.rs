//! Wiring of scanner, registry, host and broadcast into one service.
//!
//! Every completed scan pass flows through [`Synchronizer::apply`]: the
//! registry is rebuilt, the host learns about added and removed listeners,
//! and a change notification goes out if anything changed. Passes are
//! applied one at a time, so the host always ends up agreeing with the
//! registry.

use crate::broadcast::ChangeNotifier;
use crate::command::Event;
use crate::error::{CommandError, CommandResult};
use crate::host::ListenerHost;
use crate::registry::{ChangeSet, CommandRegistry};
use crate::scanner::{LocationSet, ScanConfig, Scanner};
use crate::{COMMANDS_CHANGED_NOTIFICATION, MESSAGE_CENTER_NAME};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// The running command service
pub struct Cmdivator {
    synchronizer: Arc<Synchronizer>,
    scanner: Scanner,
}

impl Cmdivator {
    /// Assemble a service over `config`; nothing is scanned until
    /// [`start`](Self::start) or [`refresh`](Self::refresh)
    pub fn new(
        config: ScanConfig,
        host: Arc<dyn ListenerHost>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            synchronizer: Arc::new(Synchronizer::new(host, notifier)),
            scanner: Scanner::new(config),
        }
    }

    /// The live registry
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        self.synchronizer.registry()
    }

    /// The underlying scanner
    #[must_use]
    pub const fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Start watching; every pass updates the registry in the background
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner cannot be started
    pub fn start(&self) -> Result<()> {
        let synchronizer = Arc::clone(&self.synchronizer);
        self.scanner.start(move |locations| {
            synchronizer.apply(&locations);
        })
    }

    /// Ask the background scanner for another pass
    ///
    /// # Errors
    ///
    /// Returns an error if the service has not been started
    pub fn rescan(&self) -> Result<()> {
        self.scanner.scan()
    }

    /// Scan on the calling thread and apply the result immediately
    pub fn refresh(&self) -> ChangeSet {
        let locations = self.scanner.scan_now();
        self.synchronizer.apply(&locations)
    }

    /// Stop watching; the registry keeps its last state
    pub fn stop(&self) {
        self.scanner.stop();
    }

    /// Run the command the event is addressed to.
    ///
    /// The registry lock is released before the process is spawned.
    ///
    /// # Errors
    ///
    /// Returns `UnknownListener` if nothing is registered under the event's
    /// listener name, otherwise whatever the command's `execute` reports
    pub fn handle_event(&self, event: &Event) -> CommandResult<u32> {
        let command = self.registry().lookup(&event.listener_name).ok_or_else(|| {
            CommandError::UnknownListener {
                listener_name: event.listener_name.clone(),
            }
        })?;

        info!(
            listener = command.listener_name(),
            event = %event.name,
            "Handling event"
        );
        command.execute(event)
    }
}

/// Applies scan results to a registry and mirrors the changes to the host
pub struct Synchronizer {
    registry: Arc<CommandRegistry>,
    host: Arc<dyn ListenerHost>,
    notifier: Arc<dyn ChangeNotifier>,
    /// Held across rebuild, host updates and publish
    apply_lock: Mutex<()>,
}

impl Synchronizer {
    /// A synchronizer over an empty registry
    pub fn new(host: Arc<dyn ListenerHost>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            registry: Arc::new(CommandRegistry::new()),
            host,
            notifier,
            apply_lock: Mutex::new(()),
        }
    }

    /// The registry this synchronizer maintains
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Apply one scan result: rebuild, update the host, broadcast on change.
    ///
    /// Concurrent calls are serialized as a whole, so a later pass never
    /// reaches the host before an earlier one has finished with it.
    pub fn apply(&self, locations: &LocationSet) -> ChangeSet {
        let _apply = self.apply_lock.lock();
        let changes = self.registry.rebuild(locations);

        for name in changes.removed.iter().chain(&changes.replaced) {
            self.host.unregister(name);
        }
        for name in changes.added.iter().chain(&changes.replaced) {
            if let Some(command) = self.registry.lookup(name) {
                self.host.register(&command);
            }
        }

        if !changes.is_empty()
            && let Err(e) = self
                .notifier
                .publish(MESSAGE_CENTER_NAME, COMMANDS_CHANGED_NOTIFICATION)
        {
            warn!(error = %e, "Failed to broadcast command change");
        }

        changes
    }
}
