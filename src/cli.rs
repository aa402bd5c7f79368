use crate::config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "brewup",
    about = "A CLI that automates upgrading Homebrew and all installed packages",
    long_about = "A CLI that automates upgrading Homebrew and all installed packages.\n\n\
        brewup runs, in order: brew update, brew upgrade for every outdated formula and \
        cask that is not excluded in the configuration file, brew autoremove and brew cleanup.\n\n\
        Examples:\n  \
        brewup              Upgrade available formulae/casks\n  \
        brewup --all        Include packages excluded in the configuration file\n  \
        brewup --select     Select which formulae/casks to upgrade\n  \
        brewup --list       See available upgrades without upgrading anything\n  \
        brewup --excluded   Only formulae/casks excluded in the configuration file",
    version
)]
pub struct Cli {
    /// Bypass all prompts and upgrade all packages, including excluded ones
    #[arg(long = "all")]
    pub all_packages: bool,

    /// Run all brew commands with the --dry-run flag
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show updates excluded by config
    #[arg(long)]
    pub excluded: bool,

    /// Pass --greedy to brew outdated, overriding the configuration file
    #[arg(long, overrides_with = "not_greedy")]
    pub greedy: bool,

    /// Do not pass --greedy to brew outdated, overriding the configuration file
    #[arg(long, overrides_with = "greedy")]
    pub not_greedy: bool,

    /// Find information about a formula or cask
    #[arg(long = "info", value_name = "NAME")]
    pub info: Option<String>,

    /// Show what would be upgraded, but do not actually upgrade anything
    #[arg(long = "list")]
    pub list: bool,

    /// Path to log file, used with --log-to-file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log to file
    #[arg(long)]
    pub log_to_file: bool,

    /// Select which packages will be upgraded
    #[arg(long = "select")]
    pub select: bool,

    /// Set verbosity level (0=INFO, 1=DEBUG, 2=TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(long, env = "BREWUP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// `Some` only when one of the greedy flags was given.
    pub fn greedy_override(&self) -> Option<bool> {
        match (self.greedy, self.not_greedy) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Where file logging goes; `None` unless `--log-to-file` was given.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_to_file
            .then(|| self.log_file.clone().unwrap_or_else(config::default_log_path))
    }
}
