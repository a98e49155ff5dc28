use crate::CmdivatorContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

pub fn execute(ctx: &CmdivatorContext) -> Result<()> {
    let scan = ctx.scan_config()?;

    output::info(&format!("config file: {}", ctx.config_path.display()));
    println!("{}", "[roots]".bold());
    for root in scan.roots() {
        let kind = if root.removable { "user" } else { "system" };
        println!("  {kind:<8} {}", root.path.display());
    }

    println!("{}", "[scan]".bold());
    println!("  max_depth       {}", scan.max_depth());
    println!("  include_hidden  {}", scan.include_hidden());
    println!("  follow_symlinks {}", scan.follow_symlinks());
    println!("  debounce        {}", humantime::format_duration(scan.debounce()));
    println!("  watch           {}", scan.watch());

    Ok(())
}
