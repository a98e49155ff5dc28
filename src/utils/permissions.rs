use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Cross-platform view of the permission bits that decide executability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePermissions {
    mode: u32,
}

impl FilePermissions {
    /// Create permissions from a raw mode value
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self { mode }
    }

    /// Get the raw mode value
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Read permissions from already-fetched metadata
    #[must_use]
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self::from_mode(metadata.mode())
        }

        #[cfg(not(unix))]
        {
            let mode = if metadata.permissions().readonly() {
                0o444
            } else {
                0o644
            };
            Self::from_mode(mode)
        }
    }

    /// Read permissions from a file, following symlinks
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for: {}", path.display()))?;
        Ok(Self::from_metadata(&metadata))
    }

    /// Check if the permissions indicate an executable file
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        #[cfg(unix)]
        {
            // Any execute bit counts
            (self.mode & 0o111) != 0
        }

        #[cfg(not(unix))]
        {
            // Executability is not carried by permission bits here
            false
        }
    }
}

/// Returns true when `path` is a regular file with an execute bit set.
///
/// Missing or unreadable paths are simply not executable.
#[must_use]
pub fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && FilePermissions::from_metadata(&m).is_executable())
        .unwrap_or(false)
}

/// Adds `u+x,g+x,o+x` to an existing file
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the mode cannot be set
pub fn mark_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let current = FilePermissions::from_path(path)?;
        let permissions = fs::Permissions::from_mode(current.mode() | 0o111);
        fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions for: {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}
