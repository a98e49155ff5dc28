use super::scanned_service;
use crate::CmdivatorContext;
use crate::output;
use anyhow::Result;

pub fn execute(ctx: &CmdivatorContext, long: bool) -> Result<()> {
    let service = scanned_service(ctx)?;
    let commands = service.registry().all();

    if commands.is_empty() {
        output::info("No commands found");
        for root in service.scanner().config().roots() {
            output::info(&format!("  searched {}", root.path.display()));
        }
        return Ok(());
    }

    for command in &commands {
        println!("{}", output::command_line(command, long));
    }

    output::info(&format!("{} command(s)", commands.len()));
    Ok(())
}
