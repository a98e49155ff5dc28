//! Commands described by a TOML definition file.
//!
//! ```toml
//! name = "Say hello"              # optional display name
//! program = "/usr/bin/echo"       # or: command = "echo 'hello world'"
//! args = ["hello"]
//! working_directory = "~"
//!
//! [env]
//! GREETING = "hi"
//! ```
//!
//! Either `program` or `command` is required. Unknown keys are ignored.
//! Problems with the file surface when the command is executed, never
//! while scanning.

use super::{Event, Origin, spawn_detached};
use crate::error::{CommandError, CommandResult};
use crate::utils::expand_tilde;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use tracing::warn;

/// Extension that marks a definition file
pub const DEFINITION_EXTENSION: &str = "toml";

/// True for regular files with the definition extension
#[must_use]
pub fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DEFINITION_EXTENSION))
        && path.is_file()
}

/// Fully resolved invocation taken from a definition file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Program to start
    pub program: PathBuf,
    /// Arguments in order
    pub args: Vec<String>,
    /// Extra environment
    pub env: Vec<(String, String)>,
    /// Working directory of the child
    pub working_directory: PathBuf,
}

/// A command whose behavior comes from a parsed definition file
#[derive(Debug, Clone)]
pub struct DefinitionCommand {
    origin: Origin,
    mapping: toml::Table,
    load_error: Option<String>,
    display_name: String,
}

impl DefinitionCommand {
    /// Read and parse the definition at `origin`.
    ///
    /// An unreadable or malformed file still yields a descriptor; the
    /// problem is reported when it is executed.
    pub(crate) fn load(origin: Origin) -> Self {
        let path = origin.canonical_path();
        let parsed = fs::read_to_string(path)
            .map_err(|e| format!("cannot read file: {e}"))
            .and_then(|content| {
                toml::from_str::<toml::Table>(&content).map_err(|e| format!("invalid TOML: {e}"))
            });

        let (mapping, load_error) = match parsed {
            Ok(mapping) => (mapping, None),
            Err(reason) => {
                warn!(path = %path.display(), %reason, "Unusable command definition");
                (toml::Table::new(), Some(reason))
            }
        };

        let display_name = mapping
            .get("name")
            .and_then(toml::Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| origin.display_name().to_string(), str::to_string);

        Self {
            origin,
            mapping,
            load_error,
            display_name,
        }
    }

    pub(crate) const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Display name, honoring a `name` key
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The parsed key/value mapping
    #[must_use]
    pub const fn mapping(&self) -> &toml::Table {
        &self.mapping
    }

    /// Resolve program, arguments, environment and working directory.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the file could not be parsed, lacks both
    /// `program` and `command`, or holds values of the wrong type
    pub fn launch_spec(&self) -> CommandResult<LaunchSpec> {
        let path = self.origin.canonical_path();
        let invalid = |reason: String| CommandError::configuration(path, reason);

        if let Some(reason) = &self.load_error {
            return Err(invalid(reason.clone()));
        }

        let base = path.parent().unwrap_or_else(|| Path::new("/"));

        let (program, mut args) = match (self.mapping.get("program"), self.mapping.get("command")) {
            (Some(program), _) => {
                let program = program
                    .as_str()
                    .ok_or_else(|| invalid("`program` must be a string".to_string()))?;
                (program.to_string(), Vec::new())
            }
            (None, Some(command)) => {
                let command = command
                    .as_str()
                    .ok_or_else(|| invalid("`command` must be a string".to_string()))?;
                let mut words = shell_words::split(command)
                    .map_err(|e| invalid(format!("cannot parse `command`: {e}")))?;
                if words.is_empty() {
                    return Err(invalid("`command` is empty".to_string()));
                }
                let program = words.remove(0);
                (program, words)
            }
            (None, None) => return Err(invalid("missing required key `program`".to_string())),
        };

        if program.trim().is_empty() {
            return Err(invalid("`program` is empty".to_string()));
        }
        let program = resolve_program(&program, base).map_err(invalid)?;

        if let Some(extra) = self.mapping.get("args") {
            let extra = extra
                .as_array()
                .ok_or_else(|| invalid("`args` must be an array of strings".to_string()))?;
            for value in extra {
                let value = value
                    .as_str()
                    .ok_or_else(|| invalid("`args` must be an array of strings".to_string()))?;
                args.push(value.to_string());
            }
        }

        let mut env = Vec::new();
        if let Some(table) = self.mapping.get("env") {
            let table = table
                .as_table()
                .ok_or_else(|| invalid("`env` must be a table of strings".to_string()))?;
            for (key, value) in table {
                let value = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("`env.{key}` must be a string")))?;
                env.push((key.clone(), value.to_string()));
            }
        }

        let working_directory = match self.mapping.get("working_directory") {
            Some(dir) => {
                let dir = dir
                    .as_str()
                    .ok_or_else(|| invalid("`working_directory` must be a string".to_string()))?;
                let dir = expand_tilde(Path::new(dir)).map_err(|e| invalid(e.to_string()))?;
                if dir.is_absolute() { dir } else { base.join(dir) }
            }
            None => base.to_path_buf(),
        };

        Ok(LaunchSpec {
            program,
            args,
            env,
            working_directory,
        })
    }

    /// Spawn the program the definition names
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unusable definition (nothing is run)
    /// and `Spawn` if the program cannot be started
    pub fn execute(&self, event: &Event) -> CommandResult<u32> {
        let spec = self.launch_spec()?;

        let mut process = ProcessCommand::new(&spec.program);
        process
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&spec.working_directory);
        event.apply(&mut process);

        spawn_detached(process, &spec.program.to_string_lossy())
    }
}

/// Paths are taken relative to the definition; bare names are looked up on `PATH`
fn resolve_program(program: &str, base: &Path) -> Result<PathBuf, String> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let expanded = expand_tilde(candidate).map_err(|e| e.to_string())?;
        return Ok(if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        });
    }

    which::which(program).map_err(|_| format!("program `{program}` not found on PATH"))
}
