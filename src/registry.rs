//! The live set of commands, keyed by listener name.
//!
//! Only [`CommandRegistry::rebuild`] mutates the registry. A rebuild
//! classifies the new locations without holding the read lock, then swaps
//! the whole map in one write, so readers always see a complete state.

use crate::command::{Command, listener_name};
use crate::scanner::{Location, LocationSet};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Level, debug, info, span, warn};

/// What a rebuild changed, by listener name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Newly discovered commands
    pub added: Vec<String>,
    /// Commands whose location disappeared
    pub removed: Vec<String>,
    /// Commands rebuilt because their location changed
    pub replaced: Vec<String>,
    /// Commands kept as-is
    pub unchanged: usize,
}

impl ChangeSet {
    /// True when nothing was added, removed, or replaced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }
}

/// Single source of truth for the available commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<Command>>>,
    /// Serializes rebuilds
    rebuild_lock: Mutex<()>,
}

impl CommandRegistry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry contents with the commands found at `locations`.
    ///
    /// Descriptors whose location is unchanged since the previous rebuild
    /// are kept (same `Arc`), so the caller does not need to re-register them.
    /// When several locations resolve to the same command, the first one in
    /// root order (system roots before user roots, then by path) claims it.
    pub fn rebuild(&self, locations: &LocationSet) -> ChangeSet {
        let _rebuild = self.rebuild_lock.lock();
        let span = span!(Level::DEBUG, "rebuild", locations = locations.len());
        let _guard = span.enter();

        let previous = self.commands.read().clone();
        let mut next: HashMap<String, Arc<Command>> = HashMap::with_capacity(previous.len());

        let mut ordered: Vec<&Location> = locations.iter().collect();
        ordered.sort_by(|a, b| {
            a.removable
                .cmp(&b.removable)
                .then_with(|| a.root.cmp(&b.root))
                .then_with(|| a.path.cmp(&b.path))
        });

        for location in ordered {
            let canonical = match location.path.canonicalize() {
                Ok(canonical) => canonical,
                Err(e) => {
                    debug!(path = %location.path.display(), error = %e, "Location vanished before classification");
                    continue;
                }
            };
            let name = listener_name(&canonical);

            if let Some(claimed) = next.get(&name) {
                warn!(
                    listener = %name,
                    kept = %claimed.location().path.display(),
                    skipped = %location.path.display(),
                    "Two locations resolve to the same command; keeping the first"
                );
                continue;
            }

            let command = match previous.get(&name) {
                Some(existing)
                    if existing.location().same_state(location) && existing.is_current() =>
                {
                    Arc::clone(existing)
                }
                _ => match Command::classify(location, canonical) {
                    Some(command) => Arc::new(command),
                    None => continue,
                },
            };

            next.insert(name, command);
        }

        let mut changes = ChangeSet::default();
        for (name, command) in &next {
            match previous.get(name) {
                None => changes.added.push(name.clone()),
                Some(old) if Arc::ptr_eq(old, command) => changes.unchanged += 1,
                Some(_) => changes.replaced.push(name.clone()),
            }
        }
        changes.removed = previous
            .keys()
            .filter(|name| !next.contains_key(*name))
            .cloned()
            .collect();

        changes.added.sort();
        changes.removed.sort();
        changes.replaced.sort();

        *self.commands.write() = next;

        if changes.is_empty() {
            debug!(unchanged = changes.unchanged, "Registry unchanged");
        } else {
            info!(
                added = changes.added.len(),
                removed = changes.removed.len(),
                replaced = changes.replaced.len(),
                unchanged = changes.unchanged,
                "Registry rebuilt"
            );
        }
        changes
    }

    /// Command registered under `listener_name`
    #[must_use]
    pub fn lookup(&self, listener_name: &str) -> Option<Arc<Command>> {
        self.commands.read().get(listener_name).cloned()
    }

    /// Resolve a user-supplied name: listener name first, then display name
    #[must_use]
    pub fn find(&self, query: &str) -> Option<Arc<Command>> {
        let commands = self.commands.read();
        if let Some(command) = commands.get(query) {
            return Some(Arc::clone(command));
        }

        let mut matches = commands.values().filter(|c| c.display_name() == query);
        let first = matches.next()?;
        if matches.next().is_some() {
            warn!(query, "Display name is ambiguous; use the listener name");
            return None;
        }
        Some(Arc::clone(first))
    }

    /// Every command, sorted by display name
    #[must_use]
    pub fn all(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<_> = self.commands.read().values().cloned().collect();
        commands.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.listener_name().cmp(b.listener_name()))
        });
        commands
    }

    /// Number of registered commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    /// True when no commands are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::scanner::ScanRoot;
    use crate::utils::permissions::mark_executable;
    use anyhow::Result;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn locations(root: &ScanRoot, paths: &[&Path]) -> Result<LocationSet> {
        paths
            .iter()
            .map(|p| Ok(Location::probe(root, *p)?))
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_rebuild_adds_and_skips_non_commands() -> Result<()> {
        let temp = TempDir::new()?;
        let root = ScanRoot::user(temp.path());
        let script = temp.path().join("foo.sh");
        let notes = temp.path().join("notes.txt");
        fs::write(&script, "#!/bin/sh\n")?;
        fs::write(&notes, "not a command")?;
        mark_executable(&script)?;

        let registry = CommandRegistry::new();
        let changes = registry.rebuild(&locations(&root, &[&script, &notes])?);

        assert_eq!(changes.added.len(), 1);
        assert_eq!(registry.len(), 1);
        let command = registry.all().pop().unwrap();
        assert_eq!(command.kind(), CommandKind::Path);
        assert_eq!(command.display_name(), "foo");
        Ok(())
    }

    #[test]
    fn test_empty_rebuild_is_empty_changeset() {
        let registry = CommandRegistry::new();
        let changes = registry.rebuild(&LocationSet::new());
        assert!(changes.is_empty());
        assert!(registry.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_by_display_name() -> Result<()> {
        let temp = TempDir::new()?;
        let root = ScanRoot::user(temp.path());
        let script = temp.path().join("hello.sh");
        fs::write(&script, "#!/bin/sh\n")?;
        mark_executable(&script)?;

        let registry = CommandRegistry::new();
        registry.rebuild(&locations(&root, &[&script])?);

        let by_name = registry.find("hello").unwrap();
        let by_listener = registry.find(by_name.listener_name()).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_listener));
        assert!(registry.find("missing").is_none());
        Ok(())
    }
}
