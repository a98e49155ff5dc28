//! Bounded-depth directory traversal.
//!
//! `DirectoryEnumerator` walks one root and returns every regular file and
//! directory below it, up to a fixed depth, with the requested metadata
//! already resolved. It never writes to the filesystem, and an unreadable
//! subtree is logged and skipped rather than failing the walk.

use crate::utils::{FilePermissions, is_hidden_name};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{Level, debug, span, warn};
use walkdir::WalkDir;

/// Metadata the enumerator resolves eagerly for each entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    /// Whether the entry is a directory
    IsDirectory,
    /// Whether the entry is a regular file
    IsRegularFile,
    /// Whether the entry carries an execute bit
    IsExecutable,
    /// Last modification time
    ModificationTime,
}

impl MetadataField {
    /// Every field, for callers that classify entries afterwards
    pub const ALL: [Self; 4] = [
        Self::IsDirectory,
        Self::IsRegularFile,
        Self::IsExecutable,
        Self::ModificationTime,
    ];

    /// Fields that need a `stat` beyond the directory listing itself
    const fn needs_stat(self) -> bool {
        matches!(self, Self::IsExecutable | Self::ModificationTime)
    }
}

/// One filesystem object found during a walk.
///
/// Fields that were not requested stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path as reached from the root (not canonicalized)
    pub path: PathBuf,
    /// Descent depth: 0 for immediate children of the root
    pub depth: usize,
    /// Resolved `IsDirectory`
    pub is_directory: Option<bool>,
    /// Resolved `IsRegularFile`
    pub is_regular_file: Option<bool>,
    /// Resolved `IsExecutable`
    pub is_executable: Option<bool>,
    /// Resolved `ModificationTime`
    pub modified: Option<SystemTime>,
}

type PrunePredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Recursive walker with a fixed depth bound and metadata set
#[derive(Clone)]
pub struct DirectoryEnumerator {
    max_depth: usize,
    fields: Vec<MetadataField>,
    include_hidden: bool,
    follow_symlinks: bool,
    prune: Option<PrunePredicate>,
}

impl fmt::Debug for DirectoryEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryEnumerator")
            .field("max_depth", &self.max_depth)
            .field("fields", &self.fields)
            .field("include_hidden", &self.include_hidden)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("prune", &self.prune.is_some())
            .finish()
    }
}

impl DirectoryEnumerator {
    /// Create an enumerator that descends at most `max_depth` levels and
    /// resolves `fields` for every entry
    #[must_use]
    pub fn new(max_depth: usize, fields: &[MetadataField]) -> Self {
        let mut unique = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(field) {
                unique.push(*field);
            }
        }

        Self {
            max_depth,
            fields: unique,
            include_hidden: false,
            follow_symlinks: true,
            prune: None,
        }
    }

    /// Yield dot-prefixed and Finder metadata entries as well
    #[must_use]
    pub const fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Follow symbolic links (loops are always detected and skipped)
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Do not descend into directories matching `predicate`.
    ///
    /// The pruned directory itself is still yielded.
    #[must_use]
    pub fn prune_with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.prune = Some(Arc::new(predicate));
        self
    }

    /// Maximum descent depth
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walk `root` and collect every regular file and directory within the
    /// depth bound.
    ///
    /// A root that is missing or not a directory yields nothing. Ordering of
    /// the returned entries is unspecified.
    #[must_use]
    pub fn enumerate(&self, root: &Path) -> Vec<Entry> {
        let span = span!(Level::DEBUG, "enumerate", root = %root.display());
        let _guard = span.enter();

        if !root.is_dir() {
            debug!("Root is not a directory, nothing to enumerate");
            return Vec::new();
        }

        let include_hidden = self.include_hidden;
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth.saturating_add(1))
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(move |e| {
                e.depth() == 0 || include_hidden || !is_hidden_name(e.file_name())
            });

        let mut entries = Vec::new();

        while let Some(next) = walker.next() {
            let dir_entry = match next {
                Ok(dir_entry) => dir_entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        debug!(error = %err, "Skipping symlink cycle");
                    } else {
                        warn!(error = %err, "Skipping unreadable entry");
                    }
                    continue;
                }
            };

            let file_type = dir_entry.file_type();
            if !file_type.is_file() && !file_type.is_dir() {
                continue;
            }

            let Some(entry) = self.resolve(&dir_entry) else {
                continue;
            };

            if file_type.is_dir()
                && let Some(prune) = &self.prune
                && prune(dir_entry.path())
            {
                walker.skip_current_dir();
            }

            entries.push(entry);
        }

        debug!(count = entries.len(), "Enumeration finished");
        entries
    }

    /// Build an `Entry`, fetching metadata only when a requested field needs it
    fn resolve(&self, dir_entry: &walkdir::DirEntry) -> Option<Entry> {
        let file_type = dir_entry.file_type();
        let metadata = if self.fields.iter().any(|f| f.needs_stat()) {
            match dir_entry.metadata() {
                Ok(metadata) => Some(metadata),
                Err(err) => {
                    debug!(path = %dir_entry.path().display(), error = %err, "Entry vanished during scan");
                    return None;
                }
            }
        } else {
            None
        };

        let mut entry = Entry {
            path: dir_entry.path().to_path_buf(),
            depth: dir_entry.depth().saturating_sub(1),
            is_directory: None,
            is_regular_file: None,
            is_executable: None,
            modified: None,
        };

        for field in &self.fields {
            match field {
                MetadataField::IsDirectory => entry.is_directory = Some(file_type.is_dir()),
                MetadataField::IsRegularFile => entry.is_regular_file = Some(file_type.is_file()),
                MetadataField::IsExecutable => {
                    entry.is_executable = metadata.as_ref().map(|m| {
                        file_type.is_file() && FilePermissions::from_metadata(m).is_executable()
                    });
                }
                MetadataField::ModificationTime => {
                    entry.modified = metadata.as_ref().and_then(|m| m.modified().ok());
                }
            }
        }

        Some(entry)
    }
}
