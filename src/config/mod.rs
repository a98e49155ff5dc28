pub mod parser;

use crate::scanner::{ScanConfig, ScanRoot};
use crate::utils::{expand_tilde, paths::make_absolute};
use crate::{DEFAULT_MAX_DEPTH, SYSTEM_COMMANDS_DIRECTORY, USER_COMMANDS_DIRECTORY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Directories that hold commands
    #[serde(default)]
    pub roots: RootsConfig,

    #[serde(default)]
    pub scan: ScanSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootsConfig {
    /// System-wide commands; never removable
    #[serde(default = "default_system_root")]
    pub system: PathBuf,
    /// Per-user commands; tilde is expanded
    #[serde(default = "default_user_root")]
    pub user: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSettings {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
    /// Quiet period after a change event before rescanning
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Watch roots for changes (otherwise scan on request only)
    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_system_root() -> PathBuf {
    PathBuf::from(SYSTEM_COMMANDS_DIRECTORY)
}

fn default_user_root() -> PathBuf {
    PathBuf::from(USER_COMMANDS_DIRECTORY)
}

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

const fn default_debounce_ms() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            system: default_system_root(),
            user: default_user_root(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            include_hidden: false,
            follow_symlinks: true,
            debounce_ms: default_debounce_ms(),
            watch: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Build the immutable scan policy, expanding `~` in the roots
    ///
    /// # Errors
    ///
    /// Returns an error if a root cannot be expanded to an absolute path
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let system = make_absolute(&expand_tilde(&self.roots.system)?)?;
        let user = make_absolute(&expand_tilde(&self.roots.user)?)?;

        Ok(ScanConfig::new(vec![ScanRoot::system(system), ScanRoot::user(user)])
            .with_max_depth(self.scan.max_depth)
            .with_hidden(self.scan.include_hidden)
            .with_symlinks(self.scan.follow_symlinks)
            .with_debounce(Duration::from_millis(self.scan.debounce_ms))
            .with_watching(self.scan.watch))
    }
}
