mod cli;
mod command;
mod config;
mod error;
mod library;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing::Level;

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(command_line.verbose))
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = command_line.command else {
        cli::Cli::command().print_help()?;
        return Ok(());
    };

    let dirs = ::config::AppDirs::resolve().context("Resolve application directories error")?;
    let cfg = config::Config::load(&dirs, command_line.config.as_deref())
        .context("Load configuration error")?;

    let cmd: Box<dyn command::Command> = match command {
        cli::Commands::Index { library } => {
            Box::new(command::IndexCommand::new(cfg, dirs, library))
        }
        cli::Commands::Add {
            library,
            entry_id,
            file,
        } => Box::new(command::AddCommand::new(cfg, dirs, library, entry_id, file)),
        cli::Commands::Remove {
            library,
            entry_id,
            file,
        } => Box::new(command::RemoveCommand::new(cfg, dirs, library, entry_id, file)),
        cli::Commands::Search {
            library,
            query,
            flags,
            no_fulltext,
            json,
        } => Box::new(command::SearchCommand::new(
            cfg,
            dirs,
            library,
            query,
            flags,
            no_fulltext,
            json,
        )),
        cli::Commands::Pattern {
            query,
            flags,
            javascript,
        } => Box::new(command::PatternCommand::new(cfg, query, flags, javascript)),
        cli::Commands::Info { library } => {
            Box::new(command::InfoCommand::new(cfg, dirs, library))
        }
        cli::Commands::ClearIndex { library } => {
            Box::new(command::ClearIndexCommand::new(cfg, dirs, library))
        }
    };
    cmd.execute().await?;

    Ok(())
}
