pub mod info;

use crate::agents::HomebrewAgent;
use crate::error::{BrewupError, Result};
use info::{InfoDocument, InfoResponse};
use std::fmt;

pub use info::DEFAULT_APP_DIR;

/// Homebrew package kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    Formula,
    Cask,
    Unknown,
}

impl PackageType {
    /// Map a top-level key of Homebrew's v2 JSON (`formulae` / `casks`).
    pub fn from_category(category: &str) -> Self {
        match category {
            "formulae" => PackageType::Formula,
            "casks" => PackageType::Cask,
            _ => PackageType::Unknown,
        }
    }

    /// The flag that restricts a brew subcommand to this kind.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            PackageType::Formula => Some("--formulae"),
            PackageType::Cask => Some("--casks"),
            PackageType::Unknown => None,
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PackageType::Formula => "formula",
            PackageType::Cask => "cask",
            PackageType::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A formula or cask as reported by Homebrew for this run.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub package_type: PackageType,
    /// Installed versions, the first one is the version in use
    pub installed: Vec<String>,
    /// Latest version available upstream
    pub current: Option<String>,
    pub pinned_version: Option<String>,
    pub excluded: bool,
    info: Option<InfoDocument>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_type: PackageType::Unknown,
            installed: Vec::new(),
            current: None,
            pinned_version: None,
            excluded: false,
            info: None,
        }
    }

    pub fn with_type(mut self, package_type: PackageType) -> Self {
        self.package_type = package_type;
        self
    }

    pub fn with_versions(mut self, installed: Vec<String>, current: Option<String>) -> Self {
        self.installed = installed;
        self.current = current.filter(|v| !v.is_empty());
        self
    }

    pub fn with_pinned_version(mut self, pinned_version: Option<String>) -> Self {
        self.pinned_version = pinned_version;
        self
    }

    pub fn excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn installed_version(&self) -> &str {
        self.installed.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_version.is_some()
    }

    pub fn is_cask(&self) -> bool {
        self.package_type == PackageType::Cask
    }

    /// Detailed info, if it has been loaded.
    pub fn info(&self) -> Option<&InfoDocument> {
        self.info.as_ref()
    }

    /// Fetch `brew info` once and cache it, resolving the package type on the way.
    pub fn load_info(&mut self, brew: &HomebrewAgent) -> Result<&InfoDocument> {
        if self.info.is_none() {
            let response = brew.info(&self.name, self.package_type)?;
            let document = self.adopt(response)?;
            self.info = Some(document);
        }

        self.info
            .as_ref()
            .ok_or_else(|| BrewupError::PackageNotFound(self.name.clone()))
    }

    fn adopt(&mut self, response: InfoResponse) -> Result<InfoDocument> {
        let (package_type, document) = response
            .select(self.package_type)
            .ok_or_else(|| BrewupError::PackageNotFound(self.name.clone()))?;

        if self.package_type == PackageType::Unknown {
            tracing::trace!("Identified {} as a {}", self.name, package_type);
            self.package_type = package_type;
        }

        if self.installed.is_empty() {
            if let Some(installed) = document.installed_version() {
                self.installed = vec![installed];
            }
        }

        Ok(document)
    }

    pub fn description(&self) -> &str {
        self.info.as_ref().map(|i| i.description()).unwrap_or("")
    }

    pub fn homepage(&self) -> &str {
        self.info.as_ref().map(|i| i.homepage()).unwrap_or("")
    }

    /// Where the cask's application bundle is installed, if it ships one.
    pub fn app_path(&self, app_dir: Option<&str>) -> Option<String> {
        let app = self.info.as_ref()?.app_artifact()?;
        let dir = app_dir.unwrap_or(DEFAULT_APP_DIR).trim_end_matches('/');
        Some(format!("{dir}/{app}"))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} -> {}",
            self.name,
            self.package_type,
            self.installed_version(),
            self.current.as_deref().unwrap_or("")
        )
    }
}
