use super::HomebrewAgent;
use crate::config::BrewupConfig;
use crate::error::{BrewupError, Result};
use crate::package::{Package, PackageType};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;

/// Response of `brew outdated --json=v2`
#[derive(Debug, Default, Deserialize)]
struct OutdatedResponse {
    #[serde(default)]
    formulae: Vec<OutdatedEntry>,
    #[serde(default)]
    casks: Vec<OutdatedEntry>,
}

#[derive(Debug, Deserialize)]
struct OutdatedEntry {
    name: String,
    #[serde(default)]
    installed_versions: Vec<String>,
    #[serde(default)]
    current_version: Option<String>,
    #[serde(default)]
    pinned_version: Option<String>,
}

/// Collects outdated formulae and casks and tags the ones excluded by config
pub struct UpdateCollector<'a> {
    brew: &'a HomebrewAgent<'a>,
    config: &'a BrewupConfig,
    greedy: Option<bool>,
}

impl<'a> UpdateCollector<'a> {
    pub fn new(brew: &'a HomebrewAgent<'a>, config: &'a BrewupConfig, greedy: Option<bool>) -> Self {
        Self {
            brew,
            config,
            greedy,
        }
    }

    /// The command-line choice wins over `greedy_casks`.
    pub fn is_greedy(&self) -> bool {
        self.greedy.unwrap_or(self.config.greedy_casks)
    }

    pub fn collect(&self) -> Result<Vec<Package>> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Identify outdated packages");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let output = self.brew.outdated(self.is_greedy());
        spinner.finish_and_clear();

        let packages = self.parse(&output?)?;
        println!("{}", "✓ Identify outdated packages".green());
        Ok(packages)
    }

    fn parse(&self, output: &str) -> Result<Vec<Package>> {
        tracing::trace!("brew outdated response: {}", output);
        let response: OutdatedResponse =
            serde_json::from_str(output).map_err(|source| BrewupError::UnexpectedOutput {
                command: "brew outdated --json=v2".to_string(),
                source,
            })?;

        let formulae = response
            .formulae
            .into_iter()
            .map(|entry| (PackageType::Formula, entry));
        let casks = response
            .casks
            .into_iter()
            .map(|entry| (PackageType::Cask, entry));

        let packages = formulae
            .chain(casks)
            .map(|(package_type, entry)| {
                let excluded = self.config.is_excluded(&entry.name);
                let package = Package::new(entry.name)
                    .with_type(package_type)
                    .with_versions(entry.installed_versions, entry.current_version)
                    .with_pinned_version(entry.pinned_version)
                    .excluded(excluded);
                tracing::trace!("Found update for {}", package);
                package
            })
            .collect();

        Ok(packages)
    }
}
