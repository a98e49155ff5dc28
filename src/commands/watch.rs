use crate::CmdivatorContext;
use crate::broadcast::ChannelNotifier;
use crate::host::LoggingHost;
use crate::output;
use crate::service::Cmdivator;
use anyhow::Result;
use std::sync::Arc;

pub fn execute(ctx: &CmdivatorContext) -> Result<()> {
    let (notifier, notifications) = ChannelNotifier::new();
    let service = Cmdivator::new(ctx.scan_config()?, Arc::new(LoggingHost), Arc::new(notifier));
    service.start()?;

    let watched = service.scanner().watched_roots();
    for root in service.scanner().config().roots() {
        if watched.contains(&root.path) {
            output::action("watching", &root.path.display().to_string());
        } else {
            output::warning(&format!(
                "{} is not watched; changes there need a restart",
                root.path.display()
            ));
        }
    }

    // Runs until the process is interrupted
    for notification in &notifications {
        output::action("changed", &notification.name);
        for command in service.registry().all() {
            println!("{}", output::command_line(&command, false));
        }
    }

    service.stop();
    Ok(())
}
