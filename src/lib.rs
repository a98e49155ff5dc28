#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

//! # Cmdivator - Commands from Files
//!
//! Cmdivator keeps a live registry of commands backed by files in a few
//! watched directories and runs the matching command when a trigger event
//! arrives from the host.
//!
//! ## Command kinds
//!
//! - **Path**: an executable file, run directly
//! - **Bundle**: a directory with an executable `run` entry point
//! - **Definition**: a TOML file naming the program and arguments to run
//!
//! ## Architecture
//!
//! - [`scanner`]: bounded-depth discovery and change-driven rescanning
//! - [`command`]: classification of locations and execution
//! - [`registry`]: the live set of commands, keyed by listener name
//! - [`broadcast`] / [`host`]: boundaries to the host platform
//! - [`service`]: wiring of all of the above
//! - [`config`]: configuration parsing and validation
//!
//! ## Example Usage
//!
//! ```no_run
//! use cmdivator::CmdivatorContext;
//! use cmdivator::broadcast::LogNotifier;
//! use cmdivator::command::Event;
//! use cmdivator::host::LoggingHost;
//! use cmdivator::service::Cmdivator;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = CmdivatorContext::new()?;
//! let service = Cmdivator::new(ctx.scan_config()?, Arc::new(LoggingHost), Arc::new(LogNotifier));
//!
//! service.refresh();
//! for command in service.registry().all() {
//!     println!("{} ({})", command.display_name(), command.listener_name());
//! }
//!
//! if let Some(command) = service.registry().find("hello") {
//!     service.handle_event(&Event::new(command.listener_name()))?;
//! }
//! # Ok(())
//! # }
//! ```

/// Change broadcast to other processes.
pub mod broadcast;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command descriptors and their execution.
pub mod command;

/// CLI subcommand implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Errors reported by command execution and deletion.
pub mod error;

/// Listener registration with the host event dispatcher.
pub mod host;

/// Output formatting for the CLI.
pub mod output;

/// The live command registry.
pub mod registry;

/// Filesystem scanning and change watching.
pub mod scanner;

/// Service glue between scanner, registry and host.
pub mod service;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the cmdivator binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the process-wide message center.
pub const MESSAGE_CENTER_NAME: &str = "net.joedj.cmdivator";

/// Notification posted whenever the command set changes.
pub const COMMANDS_CHANGED_NOTIFICATION: &str = "net.joedj.cmdivator/CommandsChanged";

/// Prefix of every listener name; the canonical path follows it.
pub const LISTENER_PREFIX: &str = "net.joedj.cmdivator.cmd:";

/// System-wide commands directory.
pub const SYSTEM_COMMANDS_DIRECTORY: &str = "/Library/Cmdivator/Cmds";

/// Per-user commands directory (tilde-expanded at startup).
pub const USER_COMMANDS_DIRECTORY: &str = "~/Library/Cmdivator/Cmds";

/// Default scan depth below each root.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/cmdivator/config.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "CMDIVATOR_CONFIG_PATH";

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct CmdivatorContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl CmdivatorContext {
    /// Load the configuration from `CMDIVATOR_CONFIG_PATH` or the default path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read, created, or validated.
    pub fn new() -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        Self::new_explicit(config_path)
    }

    /// Load the configuration from an explicit path, creating it if missing.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Scan policy derived from the configuration.
    ///
    /// # Errors
    /// Returns an error if a configured root cannot be expanded.
    pub fn scan_config(&self) -> Result<scanner::ScanConfig> {
        self.config.scan_config()
    }
}
