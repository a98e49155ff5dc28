use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use cmdivator::cli::{Cli, Commands};
use cmdivator::output::{self, Verbosity};
use cmdivator::{CmdivatorContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{e:#}"));
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "cmdivator=debug" } else { "cmdivator=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = CmdivatorContext::new()?;

    match cli.command {
        Commands::List { long } => commands::list::execute(&ctx, long)?,
        Commands::Run {
            name,
            event,
            mode,
            application,
        } => commands::run::execute(&ctx, &name, &event, &mode, application.as_deref())?,
        Commands::Delete { name } => commands::delete::execute(&ctx, &name)?,
        Commands::Watch => commands::watch::execute(&ctx)?,
        Commands::Config => commands::config::execute(&ctx)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
