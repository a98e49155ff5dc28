//! Utility functions and helpers.
//!
//! - [`paths`]: tilde expansion, home abbreviation, hidden-name policy
//! - [`permissions`]: executable-bit checks

/// Path manipulation and resolution utilities
pub mod paths;
/// Unix permission handling
pub mod permissions;

pub use paths::{abbreviate_home, expand_tilde, is_hidden_name};
pub use permissions::{FilePermissions, is_executable_file};
