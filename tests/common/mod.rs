#![allow(dead_code)]

use anyhow::Result;
use cmdivator::scanner::{ScanConfig, ScanRoot};
use cmdivator::utils::permissions::mark_executable;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A system root and a user root inside one temporary directory
pub struct CommandTree {
    pub temp_dir: TempDir,
    pub system: PathBuf,
    pub user: PathBuf,
}

impl CommandTree {
    /// Create both roots, empty
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let system = temp_dir.path().join("Library/Cmdivator/Cmds");
        let user = temp_dir.path().join("home/Library/Cmdivator/Cmds");
        fs::create_dir_all(&system)?;
        fs::create_dir_all(&user)?;

        Ok(Self {
            temp_dir,
            system,
            user,
        })
    }

    /// Manual-scan policy over both roots
    pub fn config(&self) -> ScanConfig {
        ScanConfig::new(vec![
            ScanRoot::system(&self.system),
            ScanRoot::user(&self.user),
        ])
        .with_max_depth(2)
        .with_watching(false)
    }

    /// Write an executable shell script at `root/relative`
    pub fn script(&self, root: &Path, relative: &str) -> Result<PathBuf> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "#!/bin/sh\nexit 0\n")?;
        mark_executable(&path)?;
        Ok(path)
    }

    /// Create a bundle directory with an executable `run`
    pub fn bundle(&self, root: &Path, relative: &str) -> Result<PathBuf> {
        let dir = root.join(relative);
        fs::create_dir_all(&dir)?;
        self.script(&dir, "run")?;
        Ok(dir)
    }

    /// Write a definition file with the given TOML body
    pub fn definition(&self, root: &Path, relative: &str, body: &str) -> Result<PathBuf> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Write a plain, non-executable file
    pub fn plain(&self, root: &Path, relative: &str) -> Result<PathBuf> {
        let path = root.join(relative);
        fs::write(&path, "just text")?;
        Ok(path)
    }
}
