mod cli;
mod command;
mod config;
mod error;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

// NOTE, if built using MUSL, it's probably necessary to change to use a different
// allocator just like what ripgrep does: https://github.com/BurntSushi/ripgrep/blob/0a88cccd5188074de96f54a4b6b44a63971ac157/crates/core/main.rs#L40

/// RUST_LOG 优先；否则由 -v 的次数决定日志级别
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let mut cfg = config::Config::load().context("Load configuration error")?;
    if let Some(content_root) = command_line.content_root {
        cfg.site.content_root = content_root;
    }

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Serve => Box::new(command::ServeCommand::new(cfg)),
            cli::Commands::Index => Box::new(command::IndexCommand::new(cfg)),
            cli::Commands::Search { query, page, limit } => {
                Box::new(command::SearchCommand::new(cfg, query.join(" "), page, limit))
            }
            cli::Commands::Nav { flat } => Box::new(command::NavCommand::new(cfg, flat)),
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
