mod cli_args;
mod commands;
mod config;
mod fallback;
mod git;
mod logging;
mod provider;

use clap::Parser;
use colored::Colorize;

use cli_args::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let result = match &cli.command {
        Command::Branch { provider, context } => {
            commands::branch::run(provider.as_deref(), context.as_deref())
        }
        Command::Commit {
            provider,
            context,
            auto_stage,
        } => commands::commit::run(provider.as_deref(), context.as_deref(), *auto_stage),
        Command::Config { set, get, list } => {
            commands::config::run(set.as_deref(), get.as_deref(), *list)
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
