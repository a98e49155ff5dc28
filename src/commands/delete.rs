use super::scanned_service;
use crate::CmdivatorContext;
use crate::output;
use anyhow::{Context, Result};

pub fn execute(ctx: &CmdivatorContext, name: &str) -> Result<()> {
    let service = scanned_service(ctx)?;
    let command = service
        .registry()
        .find(name)
        .with_context(|| format!("No command named '{name}' (try 'cmdivator list')"))?;

    let Some(path_command) = command.as_path() else {
        anyhow::bail!(
            "{} is a {} command; only executable files can be deleted",
            command.display_name(),
            command.kind()
        );
    };

    path_command
        .delete()
        .with_context(|| format!("Cannot delete {}", command.display_name()))?;

    let changes = service.refresh();
    output::success(&format!(
        "Deleted {} ({} command(s) removed)",
        command.display_path(),
        changes.removed.len()
    ));
    Ok(())
}
