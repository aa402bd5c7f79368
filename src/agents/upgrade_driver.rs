use super::HomebrewAgent;
use crate::config::BrewupConfig;
use crate::error::Result;
use crate::package::Package;
use crate::views;
use colored::Colorize;

/// What happened to a single package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Upgraded,
    SkippedNoVersion,
    SkippedPinned,
}

/// Upgrades selected packages one after another, then tidies up
pub struct UpgradeDriver<'a> {
    brew: &'a HomebrewAgent<'a>,
    config: &'a BrewupConfig,
    dry_run: bool,
}

impl<'a> UpgradeDriver<'a> {
    pub fn new(brew: &'a HomebrewAgent<'a>, config: &'a BrewupConfig, dry_run: bool) -> Self {
        Self {
            brew,
            config,
            dry_run,
        }
    }

    /// Arguments passed after `brew upgrade`
    pub fn upgrade_args(&self, package: &Package) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(flag) = package.package_type.flag() {
            args.push(flag.to_string());
        }
        if self.dry_run {
            args.push("--dry-run".to_string());
        }
        if package.is_cask() {
            if self.config.skips_quarantine(&package.name) {
                args.push("--no-quarantine".to_string());
            }
            if let Some(app_dir) = &self.config.app_dir {
                args.push("--appdir".to_string());
                args.push(app_dir.clone());
            }
        }

        args.push(package.name.clone());
        args
    }

    pub fn upgrade(&self, package: &mut Package) -> Result<UpgradeOutcome> {
        if package.current.is_none() {
            tracing::warn!("Skipping {} - no current version", package.name);
            return Ok(UpgradeOutcome::SkippedNoVersion);
        }
        if package.is_pinned() {
            tracing::warn!(
                "Skipping {} - pinned at {}",
                package.name,
                package.pinned_version.as_deref().unwrap_or_default()
            );
            return Ok(UpgradeOutcome::SkippedPinned);
        }

        self.brew.upgrade(&self.upgrade_args(package))?;

        if !self.dry_run && package.is_cask() {
            self.after_cask_upgrade(package)?;
        }

        println!("{}", format!("✓ Upgrade {}", package.name).green());
        Ok(UpgradeOutcome::Upgraded)
    }

    /// Upgrade each package in order, stopping at the first failure.
    pub fn upgrade_all(&self, packages: &mut [Package]) -> Result<usize> {
        let mut upgraded = 0;
        for package in packages.iter_mut() {
            if self.upgrade(package)? == UpgradeOutcome::Upgraded {
                upgraded += 1;
            }
        }
        Ok(upgraded)
    }

    fn after_cask_upgrade(&self, package: &mut Package) -> Result<()> {
        let reopen = self.config.reopens(&package.name);
        let unquarantine = self.config.skips_quarantine(&package.name);
        if !reopen && !unquarantine {
            return Ok(());
        }

        package.load_info(self.brew)?;
        let Some(app_path) = package.app_path(self.config.app_dir.as_deref()) else {
            tracing::debug!("{} has no application bundle", package.name);
            return Ok(());
        };

        if reopen && self.brew.run_auxiliary("open", &["-a", app_path.as_str()]) {
            println!("{}", format!("✓ Reopen {}", package.name).green());
        }
        if unquarantine
            && self
                .brew
                .run_auxiliary("xattr", &["-d", "com.apple.quarantine", app_path.as_str()])
        {
            println!("{}", format!("✓ Unquarantined {}", package.name).green());
        }

        Ok(())
    }

    /// `brew autoremove` followed by `brew cleanup`
    pub fn finish(&self) -> Result<()> {
        views::rule("brew autoremove");
        self.brew.autoremove(self.dry_run)?;
        println!("{}", "✓ Autoremove packages".green());

        views::rule("brew cleanup");
        self.brew.cleanup(self.dry_run)?;
        println!("{}", "✓ Cleanup Homebrew".green());
        Ok(())
    }
}
