use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Deepest descent accepted from configuration
pub const MAX_CONFIGURED_DEPTH: usize = 16;

/// Longest accepted debounce window
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Read, parse and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or fails
/// validation
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.scan.max_depth > MAX_CONFIGURED_DEPTH {
        anyhow::bail!("scan.max_depth cannot exceed {MAX_CONFIGURED_DEPTH}");
    }

    if config.scan.debounce_ms > MAX_DEBOUNCE_MS {
        anyhow::bail!("scan.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}");
    }

    for (key, root) in [("roots.system", &config.roots.system), ("roots.user", &config.roots.user)] {
        let text = root.to_string_lossy();
        if text.is_empty() {
            anyhow::bail!("{key} cannot be empty");
        }
        if !root.is_absolute() && !text.starts_with('~') {
            anyhow::bail!("{key} must be an absolute path or start with ~");
        }
    }

    if config.roots.system == config.roots.user {
        anyhow::bail!("roots.system and roots.user must differ");
    }

    Ok(())
}
