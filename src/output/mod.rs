//! Output formatting for the cmdivator CLI.
//!
//! - Dimmed colors for routine messages
//! - Bold colors for warnings and errors
//! - Verbosity control (quiet, normal, verbose)

use crate::command::{Command, CommandKind};
use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a git-style action message with dimmed verb and normal message.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// Colored tag for a command kind, padded for column output
#[must_use]
pub fn kind_label(kind: CommandKind) -> ColoredString {
    let label = format!("{:<10}", kind.to_string());
    match kind {
        CommandKind::Path => label.green(),
        CommandKind::Bundle => label.cyan(),
        CommandKind::Definition => label.magenta(),
    }
}

/// One listing line for `command`
#[must_use]
pub fn command_line(command: &Command, long: bool) -> String {
    let mut line = format!(
        "{} {}  {}",
        kind_label(command.kind()),
        command.display_name().bold(),
        command.display_path().dimmed()
    );

    if long {
        line.push_str(&format!("\n           {}", command.listener_name().dimmed()));
        if let Some(modified) = command.modified() {
            line.push_str(&format!(
                "\n           modified {}",
                humantime::format_rfc3339_seconds(modified)
            ));
        }
    }

    line
}
