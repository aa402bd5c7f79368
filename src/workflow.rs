use crate::agents::{HomebrewAgent, PackageSelector, UpdateCollector, UpgradeDriver};
use crate::config::BrewupConfig;
use crate::error::{BrewupError, Result};
use crate::package::Package;
use crate::views;
use colored::Colorize;
use std::io::{BufRead, Write};

/// Which outdated packages a run works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    /// Everything that is outdated
    All,
    /// Only packages excluded by config
    Excluded,
    /// Everything not excluded by config
    Default,
}

impl UpdateScope {
    pub fn from_flags(all_packages: bool, excluded: bool) -> Self {
        if all_packages {
            UpdateScope::All
        } else if excluded {
            UpdateScope::Excluded
        } else {
            UpdateScope::Default
        }
    }

    pub fn includes(self, package: &Package) -> bool {
        match self {
            UpdateScope::All => true,
            UpdateScope::Excluded => package.excluded,
            UpdateScope::Default => !package.excluded,
        }
    }
}

pub fn filter_updates(updates: Vec<Package>, scope: UpdateScope) -> Vec<Package> {
    updates.into_iter().filter(|p| scope.includes(p)).collect()
}

/// Options for the update/upgrade run
#[derive(Debug, Clone, Copy)]
pub struct UpgradeOptions {
    pub scope: UpdateScope,
    pub dry_run: bool,
    pub greedy: Option<bool>,
    pub list_only: bool,
    pub select: bool,
}

/// Print the info table for a formula or cask
pub fn execute_info(brew: &HomebrewAgent, name: &str) -> Result<()> {
    let mut package = Package::new(name);
    package.load_info(brew)?;

    let top_level = brew.leaves()?.iter().any(|leaf| leaf == name);
    let used_by = brew.used_by(name)?;

    println!("{}", views::info_table(&package, top_level, &used_by));
    Ok(())
}

/// Execute the update workflow: update, collect, filter, select, upgrade, tidy up
pub fn execute_upgrade<R: BufRead, W: Write>(
    brew: &HomebrewAgent,
    config: &BrewupConfig,
    options: UpgradeOptions,
    selector: &mut PackageSelector<R, W>,
) -> Result<()> {
    views::rule("brew update");
    brew.update()?;
    println!("{}", "✓ Update Homebrew".green());

    views::rule(if options.list_only {
        "Identify outdated packages"
    } else {
        "Upgrade packages"
    });

    let updates = UpdateCollector::new(brew, config, options.greedy).collect()?;
    let mut updates = filter_updates(updates, options.scope);

    if updates.is_empty() {
        println!("{}", "✓ No updates available".green().bold());
        return Ok(());
    }

    if options.list_only {
        for package in updates.iter_mut() {
            package.load_info(brew)?;
        }
        let excluded_view = options.scope == UpdateScope::Excluded;
        println!("{}", views::update_table(&updates, excluded_view));
        return Ok(());
    }

    let mut selected = match selector.choose(updates, !options.select) {
        Ok(selected) => selected,
        Err(BrewupError::UserCancelled) => {
            println!("\n{}", "Upgrade cancelled by user.".yellow());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if selected.is_empty() {
        println!("\n{}", "No packages selected, nothing to upgrade".yellow());
        return Ok(());
    }

    let driver = UpgradeDriver::new(brew, config, options.dry_run);
    let upgraded = driver.upgrade_all(&mut selected)?;
    tracing::info!("Upgraded {} of {} package(s)", upgraded, selected.len());

    driver.finish()?;

    println!(
        "\n{}",
        "✨ brewup completed successfully!".green().bold()
    );
    Ok(())
}
