//! Command-line interface definitions for cmdivator.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Main CLI structure for cmdivator.
#[derive(Parser)]
#[command(
    name = "cmdivator",
    version = crate::VERSION,
    about = "Run commands from watched directories when events fire",
    long_about = "Keeps a registry of commands backed by files in the system and user command \
                  directories, and runs the matching command for a trigger event"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List the commands found in the watched directories
    List {
        /// Also show listener names and modification times
        #[arg(short, long)]
        long: bool,
    },

    /// Run a command by listener name or display name
    Run {
        /// Listener name or display name
        name: String,

        /// Event name passed to the command
        #[arg(long, default_value = "cmdivator.cli")]
        event: String,

        /// Host mode passed to the command
        #[arg(long, default_value = "application")]
        mode: String,

        /// Originating application identifier
        #[arg(long)]
        application: Option<String>,
    },

    /// Delete a command from the user directory
    Delete {
        /// Listener name or display name
        name: String,
    },

    /// Watch the directories and report changes until interrupted
    Watch,

    /// Show the effective configuration
    Config,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
