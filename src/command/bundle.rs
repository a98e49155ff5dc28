use super::{Event, Origin, spawn_detached};
use crate::error::{CommandError, CommandResult};
use crate::utils::{FilePermissions, is_executable_file};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use std::time::SystemTime;

/// Entry point every bundle directory must contain
pub const BUNDLE_ENTRY_POINT: &str = "run";

/// True when `dir` is a directory holding an executable entry point
#[must_use]
pub fn is_bundle_dir(dir: &Path) -> bool {
    dir.is_dir() && is_executable_file(&dir.join(BUNDLE_ENTRY_POINT))
}

/// Mode and mtime of a bundle's entry point.
///
/// Editing or `chmod`-ing `run` leaves the bundle directory's own mtime
/// alone, so reuse decisions have to look at the entry point too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryPointState {
    modified: Option<SystemTime>,
    executable: bool,
}

impl EntryPointState {
    fn read(dir: &Path) -> Option<Self> {
        let metadata = fs::metadata(dir.join(BUNDLE_ENTRY_POINT)).ok()?;
        if !metadata.is_file() {
            return None;
        }
        Some(Self {
            modified: metadata.modified().ok(),
            executable: FilePermissions::from_metadata(&metadata).is_executable(),
        })
    }
}

/// A self-contained command directory
#[derive(Debug, Clone)]
pub struct BundleCommand {
    origin: Origin,
    entry_point_state: Option<EntryPointState>,
}

impl BundleCommand {
    pub(crate) fn new(origin: Origin) -> Self {
        let entry_point_state = EntryPointState::read(origin.canonical_path());
        Self {
            origin,
            entry_point_state,
        }
    }

    pub(crate) const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Executable started by [`execute`](Self::execute)
    #[must_use]
    pub fn entry_point(&self) -> PathBuf {
        self.origin.canonical_path().join(BUNDLE_ENTRY_POINT)
    }

    /// True while the entry point is still executable and unmodified since
    /// this descriptor was built
    #[must_use]
    pub fn is_current(&self) -> bool {
        let now = EntryPointState::read(self.origin.canonical_path());
        now.is_some_and(|state| state.executable) && now == self.entry_point_state
    }

    /// Run the entry point inside the bundle directory
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry point disappeared, `Spawn` if it
    /// cannot be started
    pub fn execute(&self, event: &Event) -> CommandResult<u32> {
        let entry_point = self.entry_point();
        if !entry_point.is_file() {
            return Err(CommandError::NotFound { path: entry_point });
        }

        let mut process = ProcessCommand::new(&entry_point);
        process.current_dir(self.origin.canonical_path());
        event.apply(&mut process);

        spawn_detached(process, &entry_point.to_string_lossy())
    }
}
