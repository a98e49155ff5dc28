use super::scanned_service;
use crate::CmdivatorContext;
use crate::command::Event;
use crate::output;
use anyhow::{Context, Result};

pub fn execute(
    ctx: &CmdivatorContext,
    name: &str,
    event_name: &str,
    mode: &str,
    application: Option<&str>,
) -> Result<()> {
    let service = scanned_service(ctx)?;
    let command = service
        .registry()
        .find(name)
        .with_context(|| format!("No command named '{name}' (try 'cmdivator list')"))?;

    let mut event = Event::new(command.listener_name())
        .with_name(event_name)
        .with_mode(mode);
    if let Some(application) = application {
        event = event.with_application(application);
    }

    let pid = service
        .handle_event(&event)
        .with_context(|| format!("Failed to run {}", command.display_name()))?;

    output::action("started", &format!("{} (pid {pid})", command.display_name()));
    Ok(())
}
