//! The scanner: repeated, change-triggered scans of the watched roots.
//!
//! A single worker thread owns scanning. Manual requests and filesystem
//! change events both go through one request queue; the worker drains every
//! request that piled up while it was busy before starting the next pass, so
//! a burst of events costs exactly one follow-up scan.

use super::{DirectoryEnumerator, Location, LocationSet, MetadataField, ScanConfig, ScanRoot};
use crate::command::bundle::is_bundle_dir;
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{Level, debug, info, span, warn};

/// Lifecycle of a [`Scanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// Not started, or stopped
    Idle,
    /// A pass is walking the roots
    Scanning,
    /// Waiting for changes or requests
    Watching,
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scanning => write!(f, "scanning"),
            Self::Watching => write!(f, "watching"),
        }
    }
}

/// Consumer of completed scan passes
pub type ScanCallback = Box<dyn Fn(LocationSet) + Send + 'static>;

enum Request {
    Scan,
    Stop,
}

struct Shared {
    config: ScanConfig,
    enumerator: DirectoryEnumerator,
    state: Mutex<ScannerState>,
    /// Held for the duration of every pass
    pass_lock: Mutex<()>,
    passes: AtomicU64,
}

impl Shared {
    fn set_state(&self, state: ScannerState) {
        *self.state.lock() = state;
    }

    /// Run one full pass over every root
    fn run_pass(&self) -> LocationSet {
        let _pass = self.pass_lock.lock();
        let span = span!(Level::DEBUG, "scan_pass");
        let _guard = span.enter();

        {
            let mut state = self.state.lock();
            if *state == ScannerState::Watching {
                *state = ScannerState::Scanning;
            }
        }

        let per_root: Vec<Vec<Location>> = self
            .config
            .roots()
            .par_iter()
            .map(|root| self.scan_root(root))
            .collect();

        let mut locations = LocationSet::new();
        for batch in per_root {
            for location in batch {
                if locations.contains(&location) {
                    debug!(path = %location.path.display(), "Location already found under an earlier root");
                    continue;
                }
                locations.insert(location);
            }
        }

        {
            let mut state = self.state.lock();
            if *state == ScannerState::Scanning {
                *state = ScannerState::Watching;
            }
        }

        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(pass, count = locations.len(), "Scan pass complete");
        locations
    }

    fn scan_root(&self, root: &ScanRoot) -> Vec<Location> {
        if !root.path.exists() {
            debug!(root = %root.path.display(), "Root does not exist, skipping");
            return Vec::new();
        }

        self.enumerator
            .enumerate(&root.path)
            .into_iter()
            .map(|entry| Location::from_entry(root, entry))
            .collect()
    }
}

struct Running {
    requests: Sender<Request>,
    worker: JoinHandle<()>,
    watcher: Option<RecommendedWatcher>,
    watched: Vec<PathBuf>,
}

/// Watches the configured roots and delivers a fresh [`LocationSet`] to its
/// callback whenever they change.
pub struct Scanner {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Scanner {
    /// Create an idle scanner for `config`
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        let enumerator = DirectoryEnumerator::new(config.max_depth(), &MetadataField::ALL)
            .include_hidden(config.include_hidden())
            .follow_symlinks(config.follow_symlinks())
            .prune_with(is_bundle_dir);

        Self {
            shared: Arc::new(Shared {
                config,
                enumerator,
                state: Mutex::new(ScannerState::Idle),
                pass_lock: Mutex::new(()),
                passes: AtomicU64::new(0),
            }),
            running: Mutex::new(None),
        }
    }

    /// The policy this scanner was built with
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.shared.config
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ScannerState {
        *self.shared.state.lock()
    }

    /// Number of passes completed so far, manual or triggered
    #[must_use]
    pub fn completed_passes(&self) -> u64 {
        self.shared.passes.load(Ordering::SeqCst)
    }

    /// Roots that currently have an OS watch established
    #[must_use]
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.running
            .lock()
            .as_ref()
            .map(|running| running.watched.clone())
            .unwrap_or_default()
    }

    /// Begin watching and run an initial scan.
    ///
    /// Every completed pass is handed to `callback` on the scanner's worker
    /// thread. Roots that cannot be watched still take part in scans.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner is already running or the worker
    /// thread cannot be spawned
    pub fn start<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(LocationSet) + Send + 'static,
    {
        let mut running = self.running.lock();
        if running.is_some() {
            anyhow::bail!("Scanner is already running");
        }

        let (tx, rx) = unbounded();
        let shared = Arc::clone(&self.shared);
        let callback: ScanCallback = Box::new(callback);

        let worker = thread::Builder::new()
            .name("cmdivator-scanner".to_string())
            .spawn(move || run_worker(&shared, &rx, &callback))
            .context("Failed to spawn scanner worker")?;
        self.shared.set_state(ScannerState::Watching);

        let (watcher, watched) = if self.shared.config.watch() {
            watch_roots(self.shared.config.roots(), tx.clone())
        } else {
            debug!("Change watching disabled, manual scans only");
            (None, Vec::new())
        };

        tx.send(Request::Scan)
            .context("Scanner worker exited before the initial scan")?;

        info!(roots = self.shared.config.roots().len(), watched = watched.len(), "Scanner started");

        *running = Some(Running {
            requests: tx,
            worker,
            watcher,
            watched,
        });
        Ok(())
    }

    /// Request a scan pass on the worker.
    ///
    /// Requests made while a pass is running collapse into a single
    /// follow-up pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has not been started
    pub fn scan(&self) -> Result<()> {
        let running = self.running.lock();
        let Some(running) = running.as_ref() else {
            anyhow::bail!("Scanner is not running");
        };
        running
            .requests
            .send(Request::Scan)
            .context("Scanner worker has exited")
    }

    /// Run one pass on the calling thread and return its locations.
    ///
    /// Waits for any pass already in flight.
    #[must_use]
    pub fn scan_now(&self) -> LocationSet {
        self.shared.run_pass()
    }

    /// Release the OS watches, let the current pass finish, and return to idle.
    ///
    /// Change events arriving afterwards are discarded. Stopping an idle
    /// scanner does nothing.
    pub fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        let Running {
            requests,
            worker,
            watcher,
            watched,
        } = running;

        if let Some(mut watcher) = watcher {
            for root in &watched {
                if let Err(e) = watcher.unwatch(root) {
                    debug!(root = %root.display(), error = %e, "Failed to unwatch root");
                }
            }
        }

        let _ = requests.send(Request::Stop);
        drop(requests);

        if worker.join().is_err() {
            warn!("Scanner worker panicked");
        }

        self.shared.set_state(ScannerState::Idle);
        info!("Scanner stopped");
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: &Shared, requests: &Receiver<Request>, callback: &ScanCallback) {
    while let Ok(request) = requests.recv() {
        if matches!(request, Request::Stop) {
            break;
        }

        let debounce = shared.config.debounce();
        if !debounce.is_zero() {
            thread::sleep(debounce);
        }

        let mut coalesced = 0usize;
        let mut stop = false;
        for pending in requests.try_iter() {
            match pending {
                Request::Scan => coalesced += 1,
                Request::Stop => stop = true,
            }
        }
        if stop {
            break;
        }
        if coalesced > 0 {
            debug!(coalesced, "Coalesced pending scan requests");
        }

        let locations = shared.run_pass();
        callback(locations);
    }

    debug!("Scanner worker exiting");
}

/// Establish a recursive watch on every existing root.
///
/// Failures are logged; the affected roots fall back to manual scanning.
fn watch_roots(
    roots: &[ScanRoot],
    requests: Sender<Request>,
) -> (Option<RecommendedWatcher>, Vec<PathBuf>) {
    let handler = move |res: notify::Result<notify::Event>| match res {
        Ok(event) => {
            if matches!(event.kind, EventKind::Access(_)) {
                return;
            }
            // One signal per burst is enough; the worker coalesces the rest
            let _ = requests.send(Request::Scan);
        }
        Err(e) => warn!(error = %e, "Filesystem watch error"),
    };

    let mut watcher = match RecommendedWatcher::new(handler, notify::Config::default()) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "Change watching unavailable, manual scans only");
            return (None, Vec::new());
        }
    };

    let mut watched = Vec::new();
    for root in roots {
        if !root.path.is_dir() {
            warn!(root = %root.path.display(), "Root missing, manual scans only for it");
            continue;
        }
        match watcher.watch(&root.path, RecursiveMode::Recursive) {
            Ok(()) => watched.push(root.path.clone()),
            Err(e) => {
                warn!(root = %root.path.display(), error = %e, "Cannot watch root, manual scans only for it");
            }
        }
    }

    (Some(watcher), watched)
}
