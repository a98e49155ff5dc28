//! Command descriptors: what a scanned location means and how to run it.
//!
//! A location becomes exactly one of three variants:
//!
//! - [`PathCommand`]: an executable file, run directly
//! - [`BundleCommand`]: a directory with an executable `run` entry point
//! - [`DefinitionCommand`]: a TOML file naming the program to run
//!
//! Descriptors are immutable. When the backing location changes the
//! registry builds a new one rather than updating the old.

/// Directory bundles with a `run` entry point.
pub mod bundle;
/// TOML definition files.
pub mod definition;
/// Trigger events and the environment they export.
pub mod event;
/// Directly executable files.
pub mod path;

pub use bundle::BundleCommand;
pub use definition::{DefinitionCommand, LaunchSpec};
pub use event::Event;
pub use path::PathCommand;

use crate::LISTENER_PREFIX;
use crate::error::{CommandError, CommandResult};
use crate::scanner::{EntryKind, Location};
use crate::utils::abbreviate_home;
use command_group::CommandGroup;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command as ProcessCommand, Stdio};
use std::thread;
use std::time::SystemTime;
use tracing::{Level, debug, info, span, warn};

/// Separator placed between nested path segments in display names
pub const DISPLAY_SEPARATOR: &str = " → ";

/// Which variant a descriptor is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Executable file
    Path,
    /// Directory bundle
    Bundle,
    /// Definition file
    Definition,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Bundle => write!(f, "bundle"),
            Self::Definition => write!(f, "definition"),
        }
    }
}

/// Identity and display data shared by every variant
#[derive(Debug, Clone)]
pub struct Origin {
    location: Location,
    canonical: PathBuf,
    display_name: String,
    display_path: String,
    listener_name: String,
}

impl Origin {
    /// Derive names for `location`, whose canonical form is `canonical`
    #[must_use]
    pub fn new(location: Location, canonical: PathBuf) -> Self {
        let display_name = display_name(&location.path, &location.root);
        let display_path = abbreviate_home(&location.path);
        let listener_name = listener_name(&canonical);

        Self {
            location,
            canonical,
            display_name,
            display_path,
            listener_name,
        }
    }

    /// The scanned location
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Fully resolved absolute path
    #[must_use]
    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    /// Label derived from the path relative to its root
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Location with the home directory abbreviated
    #[must_use]
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// Registration key with the event dispatcher
    #[must_use]
    pub fn listener_name(&self) -> &str {
        &self.listener_name
    }
}

/// One invocable command
#[derive(Debug, Clone)]
pub enum Command {
    /// An executable file
    Path(PathCommand),
    /// A directory bundle
    Bundle(BundleCommand),
    /// A TOML definition file
    Definition(DefinitionCommand),
}

impl Command {
    /// Classify `location` and build the matching descriptor.
    ///
    /// Returns `None` for locations that are not commands, including
    /// locations that vanished before they could be canonicalized.
    #[must_use]
    pub fn from_location(location: &Location) -> Option<Self> {
        let canonical = match location.path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                debug!(path = %location.path.display(), error = %e, "Cannot canonicalize location");
                return None;
            }
        };
        Self::classify(location, canonical)
    }

    /// Classify with an already canonicalized path
    #[must_use]
    pub fn classify(location: &Location, canonical: PathBuf) -> Option<Self> {
        match location.kind {
            EntryKind::Directory => {
                if bundle::is_bundle_dir(&location.path) {
                    Some(Self::Bundle(BundleCommand::new(Origin::new(
                        location.clone(),
                        canonical,
                    ))))
                } else {
                    None
                }
            }
            EntryKind::File if definition::is_definition_file(&location.path) => Some(
                Self::Definition(DefinitionCommand::load(Origin::new(location.clone(), canonical))),
            ),
            EntryKind::File if location.executable => Some(Self::Path(PathCommand::new(
                Origin::new(location.clone(), canonical),
            ))),
            EntryKind::File => None,
        }
    }

    fn origin(&self) -> &Origin {
        match self {
            Self::Path(command) => command.origin(),
            Self::Bundle(command) => command.origin(),
            Self::Definition(command) => command.origin(),
        }
    }

    /// Variant tag
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Path(_) => CommandKind::Path,
            Self::Bundle(_) => CommandKind::Bundle,
            Self::Definition(_) => CommandKind::Definition,
        }
    }

    /// Human-friendly label
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Definition(command) => command.display_name(),
            _ => self.origin().display_name(),
        }
    }

    /// Location with the home directory abbreviated
    #[must_use]
    pub fn display_path(&self) -> &str {
        self.origin().display_path()
    }

    /// Identity with the event dispatcher and key in the registry
    #[must_use]
    pub fn listener_name(&self) -> &str {
        self.origin().listener_name()
    }

    /// Canonical backing path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.origin().canonical_path()
    }

    /// The scanned location this descriptor was built from
    #[must_use]
    pub fn location(&self) -> &Location {
        self.origin().location()
    }

    /// Modification time of the backing location at scan time
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        self.location().modified
    }

    /// False when the backing files changed in a way the scanned location
    /// does not show, such as a bundle's entry point losing its execute bit
    #[must_use]
    pub fn is_current(&self) -> bool {
        match self {
            Self::Bundle(command) => command.is_current(),
            Self::Path(_) | Self::Definition(_) => true,
        }
    }

    /// The path-backed variant, the only one that can be deleted
    #[must_use]
    pub const fn as_path(&self) -> Option<&PathCommand> {
        match self {
            Self::Path(command) => Some(command),
            _ => None,
        }
    }

    /// Spawn the command for `event` without waiting for it.
    ///
    /// Returns the process id of the spawned child.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unusable definition file and `Spawn`
    /// if the process cannot be started
    pub fn execute(&self, event: &Event) -> CommandResult<u32> {
        match self {
            Self::Path(command) => command.execute(event),
            Self::Bundle(command) => command.execute(event),
            Self::Definition(command) => command.execute(event),
        }
    }
}

/// Registry key for a canonical path.
///
/// Distinct paths always produce distinct names: UTF-8 paths are used
/// verbatim, anything else is escaped and quoted.
#[must_use]
pub fn listener_name(canonical: &Path) -> String {
    match canonical.to_str() {
        Some(path) => format!("{LISTENER_PREFIX}{path}"),
        None => format!("{LISTENER_PREFIX}{canonical:?}"),
    }
}

/// Label for `path` found under `root`: extension stripped, nested segments
/// joined with [`DISPLAY_SEPARATOR`]
#[must_use]
pub fn display_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.last_mut() {
        let stem = Path::new(last.as_str())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stem.is_empty() {
            *last = stem;
        }
    }

    segments.join(DISPLAY_SEPARATOR)
}

/// Spawn `process` in its own process group and reap it in the background
pub(crate) fn spawn_detached(mut process: ProcessCommand, program: &str) -> CommandResult<u32> {
    let span = span!(Level::DEBUG, "spawn", program);
    let _guard = span.enter();

    process.stdin(Stdio::null());

    let mut child = process.group_spawn().map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let pid = child.id();

    let label = program.to_string();
    let reaper = thread::Builder::new()
        .name("cmdivator-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => debug!(program = %label, %status, "Command exited"),
            Err(e) => warn!(program = %label, error = %e, "Failed to wait for command"),
        });
    if let Err(e) = reaper {
        warn!(error = %e, "Failed to spawn reaper thread; child will not be reaped");
    }

    info!(pid, "Command spawned");
    Ok(pid)
}
