//! Discovery of command locations under the watched roots.
//!
//! - [`enumerator`]: bounded-depth walk of a single root
//! - [`watcher`]: the [`Scanner`] that rescans on filesystem changes
//!
//! A scan produces a [`LocationSet`], the union of every candidate location
//! under every root. Classification into commands happens later, in the
//! registry.

/// Bounded-depth directory traversal.
pub mod enumerator;

/// Change-driven rescanning of the watched roots.
pub mod watcher;

pub use enumerator::{DirectoryEnumerator, Entry, MetadataField};
pub use watcher::{Scanner, ScannerState};

use crate::utils::{FilePermissions, expand_tilde};
use crate::{DEFAULT_MAX_DEPTH, SYSTEM_COMMANDS_DIRECTORY, USER_COMMANDS_DIRECTORY};
use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A watched directory and whether its commands may be deleted by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    /// Absolute directory path
    pub path: PathBuf,
    /// True for the user-writable root
    pub removable: bool,
}

impl ScanRoot {
    /// The system-wide root; its commands are never removable
    #[must_use]
    pub fn system(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removable: false,
        }
    }

    /// The per-user root; its path commands can be deleted
    #[must_use]
    pub fn user(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removable: true,
        }
    }
}

/// Immutable scan policy handed to the [`Scanner`] at construction
#[derive(Debug, Clone)]
pub struct ScanConfig {
    roots: Vec<ScanRoot>,
    max_depth: usize,
    include_hidden: bool,
    follow_symlinks: bool,
    debounce: Duration,
    watch: bool,
}

impl ScanConfig {
    /// Scan `roots` in order with the default policy
    #[must_use]
    pub const fn new(roots: Vec<ScanRoot>) -> Self {
        Self {
            roots,
            max_depth: DEFAULT_MAX_DEPTH,
            include_hidden: false,
            follow_symlinks: true,
            debounce: Duration::ZERO,
            watch: true,
        }
    }

    /// The two standard roots: system-wide first, then the user's own
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    pub fn standard() -> Result<Self> {
        let user = expand_tilde(Path::new(USER_COMMANDS_DIRECTORY))?;
        Ok(Self::new(vec![
            ScanRoot::system(SYSTEM_COMMANDS_DIRECTORY),
            ScanRoot::user(user),
        ]))
    }

    /// Set the maximum descent depth (0 = immediate children only)
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Also consider dot-prefixed entries
    #[must_use]
    pub const fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Follow symbolic links while walking
    #[must_use]
    pub const fn with_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    /// Let bursts of change events settle for `debounce` before scanning
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Enable or disable OS change watching (manual scans only when off)
    #[must_use]
    pub const fn with_watching(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Roots in scan order
    #[must_use]
    pub fn roots(&self) -> &[ScanRoot] {
        &self.roots
    }

    /// Maximum descent depth
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether hidden entries are scanned
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Whether symlinks are followed
    #[must_use]
    pub const fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Debounce window for change events
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Whether OS change watching is requested
    #[must_use]
    pub const fn watch(&self) -> bool {
        self.watch
    }
}

/// What a location is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// A candidate command location produced by a scan.
///
/// Equality and hashing use `path` only, so a [`LocationSet`] holds each
/// path once regardless of its metadata.
#[derive(Debug, Clone)]
pub struct Location {
    /// Path as discovered under the root
    pub path: PathBuf,
    /// Root the path was found under
    pub root: PathBuf,
    /// Inherited from the root
    pub removable: bool,
    /// File or directory
    pub kind: EntryKind,
    /// Execute bit on a regular file
    pub executable: bool,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
}

impl Location {
    /// Convert an enumerator entry found under `root`.
    ///
    /// Entries must have been enumerated with [`MetadataField::ALL`].
    #[must_use]
    pub fn from_entry(root: &ScanRoot, entry: Entry) -> Self {
        let kind = if entry.is_directory.unwrap_or(false) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Self {
            path: entry.path,
            root: root.path.clone(),
            removable: root.removable,
            kind,
            executable: entry.is_executable.unwrap_or(false),
            modified: entry.modified,
        }
    }

    /// Stat `path` directly and describe it as a location under `root`
    ///
    /// # Errors
    ///
    /// Returns the I/O error if `path` cannot be stat'ed, or `InvalidInput`
    /// if it is neither a regular file nor a directory
    pub fn probe(root: &ScanRoot, path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file or directory: {}", path.display()),
            ));
        };

        Ok(Self {
            root: root.path.clone(),
            removable: root.removable,
            kind,
            executable: kind == EntryKind::File
                && FilePermissions::from_metadata(&metadata).is_executable(),
            modified: metadata.modified().ok(),
            path,
        })
    }

    /// True when nothing that drives classification changed between scans
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.path == other.path
            && self.kind == other.kind
            && self.executable == other.executable
            && self.modified == other.modified
            && self.removable == other.removable
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// The union of candidate locations across all roots
pub type LocationSet = HashSet<Location>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_standard_roots() -> Result<()> {
        let config = ScanConfig::standard()?;
        let roots = config.roots();

        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].path, PathBuf::from(SYSTEM_COMMANDS_DIRECTORY));
        assert!(!roots[0].removable);
        assert!(roots[1].path.ends_with("Library/Cmdivator/Cmds"));
        assert!(roots[1].removable);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        Ok(())
    }

    #[test]
    fn test_probe_file_and_directory() -> Result<()> {
        let temp = TempDir::new()?;
        let root = ScanRoot::user(temp.path());
        fs::write(temp.path().join("foo.sh"), "#!/bin/sh\n")?;
        fs::create_dir(temp.path().join("bar"))?;

        let file = Location::probe(&root, temp.path().join("foo.sh"))?;
        assert_eq!(file.kind, EntryKind::File);
        assert!(!file.executable);
        assert!(file.removable);
        assert!(file.modified.is_some());

        let dir = Location::probe(&root, temp.path().join("bar"))?;
        assert_eq!(dir.kind, EntryKind::Directory);

        assert!(Location::probe(&root, temp.path().join("missing")).is_err());
        Ok(())
    }

    #[test]
    fn test_set_is_keyed_by_path() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("foo.sh"), "")?;

        let a = Location::probe(&ScanRoot::user(temp.path()), temp.path().join("foo.sh"))?;
        let mut b = a.clone();
        b.modified = None;

        let mut set = LocationSet::new();
        set.insert(a.clone());
        set.insert(b.clone());

        assert_eq!(set.len(), 1);
        assert!(!a.same_state(&b));
        Ok(())
    }
}
