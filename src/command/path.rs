use super::{Event, Origin, spawn_detached};
use crate::error::{CommandError, CommandResult};
use std::fs;
use std::process::Command as ProcessCommand;
use tracing::info;

/// An executable file run as-is
#[derive(Debug, Clone)]
pub struct PathCommand {
    origin: Origin,
}

impl PathCommand {
    pub(crate) const fn new(origin: Origin) -> Self {
        Self { origin }
    }

    pub(crate) const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether the user may delete this command (true under the user root)
    #[must_use]
    pub const fn is_removable(&self) -> bool {
        self.origin.location().removable
    }

    /// Run the file with its directory as working directory
    ///
    /// # Errors
    ///
    /// Returns `Spawn` if the file cannot be executed
    pub fn execute(&self, event: &Event) -> CommandResult<u32> {
        let path = self.origin.canonical_path();
        let mut process = ProcessCommand::new(path);
        if let Some(dir) = path.parent() {
            process.current_dir(dir);
        }
        event.apply(&mut process);

        spawn_detached(process, &path.to_string_lossy())
    }

    /// Remove the backing file.
    ///
    /// A symlinked command loses only the link, never its target.
    ///
    /// # Errors
    ///
    /// Returns `NotRemovable` outside the user root, or the mapped I/O error
    /// if removal fails
    pub fn delete(&self) -> CommandResult<()> {
        let path = &self.origin.location().path;
        if !self.is_removable() {
            return Err(CommandError::NotRemovable { path: path.clone() });
        }

        fs::remove_file(path).map_err(|e| CommandError::from_io(path, e))?;
        info!(path = %path.display(), "Deleted command");
        Ok(())
    }
}
