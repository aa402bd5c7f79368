mod agents;
mod cli;
mod config;
mod error;
mod logging;
mod package;
mod utils;
mod views;
mod workflow;

use agents::{HomebrewAgent, PackageSelector, SystemCommandRunner};
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::ConfigLoader;
use error::Result;
use logging::LoggingOptions;
use std::process;
use workflow::{UpdateScope, UpgradeOptions};

fn main() {
    let cli = Cli::parse();

    let guard = match logging::init(&LoggingOptions::new(cli.verbose, cli.log_path())) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            None
        }
    };

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(target: logging::FAILURE_TARGET, "{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            1
        }
    };

    // process::exit skips destructors; flush the log file first
    drop(guard);
    process::exit(code);
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config = ConfigLoader::new(&config_path).load()?;

    let runner = SystemCommandRunner;
    let brew = HomebrewAgent::new(&runner, config.homebrew_command.clone());

    if let Some(name) = &cli.info {
        return workflow::execute_info(&brew, name);
    }

    let options = UpgradeOptions {
        scope: UpdateScope::from_flags(cli.all_packages, cli.excluded),
        dry_run: cli.dry_run,
        greedy: cli.greedy_override(),
        list_only: cli.list,
        select: cli.select,
    };
    let mut selector = PackageSelector::stdio();
    workflow::execute_upgrade(&brew, &config, options, &mut selector)
}
