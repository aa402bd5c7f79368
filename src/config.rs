use crate::error::{BrewupError, FieldError, Result};
use crate::utils::executable::ExecutableResolver;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "brewup";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "brewup.log";
const KNOWN_KEYS: &[&str] = &[
    "app_dir",
    "exclude_updades",
    "greedy_casks",
    "homebrew_command",
    "no_quarantine",
    "reopen_casks",
];

/// Written to disk the first time brewup runs without a configuration file.
pub const DEFAULT_CONFIG: &str = r#"# brewup configuration

# Formulae and casks that are never upgraded unless --all or --excluded is passed
exclude_updades = []

# Pass --greedy to `brew outdated` so casks with auto-updates are included
greedy_casks = false

# Command used to invoke Homebrew
homebrew_command = "brew"

# Casks to reopen after they have been upgraded
reopen_casks = []

# Casks upgraded with --no-quarantine and unquarantined afterwards
no_quarantine = []

# Target location for applications, mirrors `brew upgrade --appdir`
# app_dir = "/Applications"
"#;

/// User configuration, loaded once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewupConfig {
    pub app_dir: Option<String>,
    pub exclude_updades: Vec<String>,
    pub greedy_casks: bool,
    pub homebrew_command: String,
    pub reopen_casks: Vec<String>,
    pub no_quarantine: Vec<String>,
}

impl Default for BrewupConfig {
    fn default() -> Self {
        Self {
            app_dir: None,
            exclude_updades: Vec::new(),
            greedy_casks: false,
            homebrew_command: "brew".to_string(),
            reopen_casks: Vec::new(),
            no_quarantine: Vec::new(),
        }
    }
}

impl BrewupConfig {
    /// Returns true when `name` is in the exclusion list.
    pub fn is_excluded(&self, name: &str) -> bool {
        contains_ignore_case(&self.exclude_updades, name)
    }

    /// Returns true when the cask should be reopened after an upgrade.
    pub fn reopens(&self, name: &str) -> bool {
        contains_ignore_case(&self.reopen_casks, name)
    }

    /// Returns true when the cask is installed without quarantine.
    pub fn skips_quarantine(&self, name: &str) -> bool {
        contains_ignore_case(&self.no_quarantine, name)
    }
}

fn contains_ignore_case(list: &[String], name: &str) -> bool {
    let name = name.to_lowercase();
    list.iter().any(|entry| entry.to_lowercase() == name)
}

/// Directory holding the configuration file and the default log file.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

pub fn default_log_path() -> PathBuf {
    app_dir().join(LOG_FILE_NAME)
}

/// Reads and validates the configuration file
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the configuration, writing the default file first if none exists.
    pub fn load(&self) -> Result<BrewupConfig> {
        self.ensure_exists()?;

        let content = fs::read_to_string(&self.path).map_err(|source| BrewupError::ConfigRead {
            path: self.path.clone(),
            source,
        })?;

        let config = self.parse(&content)?;
        self.validate_command(&config)?;
        tracing::debug!("Loaded configuration from {}", self.path.display());
        Ok(config)
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, DEFAULT_CONFIG)?;
        tracing::info!(
            "Created default configuration file: {}",
            self.path.display()
        );
        Ok(())
    }

    /// Parse the file contents, collecting every field error rather than stopping at the first.
    pub fn parse(&self, content: &str) -> Result<BrewupConfig> {
        let table: toml::Table = toml::from_str(content).map_err(|e| BrewupError::InvalidConfig {
            path: self.path.clone(),
            errors: vec![FieldError::new("file", e.message().to_string())],
        })?;

        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!("Ignoring unknown configuration key '{}'", key);
            }
        }

        let mut errors = Vec::new();
        let mut config = BrewupConfig::default();

        if let Some(value) = field(&table, "app_dir", &mut errors) {
            config.app_dir = Some(value);
        }
        if let Some(value) = field(&table, "exclude_updades", &mut errors) {
            config.exclude_updades = value;
        }
        if let Some(value) = field(&table, "greedy_casks", &mut errors) {
            config.greedy_casks = value;
        }
        if let Some(value) = field(&table, "homebrew_command", &mut errors) {
            config.homebrew_command = value;
        }
        if let Some(value) = field(&table, "reopen_casks", &mut errors) {
            config.reopen_casks = value;
        }
        if let Some(value) = field(&table, "no_quarantine", &mut errors) {
            config.no_quarantine = value;
        }

        if !errors.is_empty() {
            return Err(BrewupError::InvalidConfig {
                path: self.path.clone(),
                errors,
            });
        }

        Ok(config)
    }

    fn validate_command(&self, config: &BrewupConfig) -> Result<()> {
        match ExecutableResolver::resolve(&config.homebrew_command) {
            Some(resolved) => {
                tracing::trace!("Resolved homebrew_command to {}", resolved.display());
                Ok(())
            }
            None => Err(BrewupError::InvalidConfig {
                path: self.path.clone(),
                errors: vec![FieldError::new(
                    "homebrew_command",
                    format!("{} is not available in the PATH", config.homebrew_command),
                )],
            }),
        }
    }
}

fn field<T: DeserializeOwned>(
    table: &toml::Table,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = table.get(key)?.clone();
    match value.try_into::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(FieldError::new(key, e.message().to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn loader() -> ConfigLoader {
        ConfigLoader::new("/tmp/brewup-test/config.toml")
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = loader().parse("").unwrap();
        assert_eq!(config, BrewupConfig::default());
        assert_eq!(config.homebrew_command, "brew");
    }

    #[test]
    fn default_file_parses_to_defaults() {
        let config = loader().parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, BrewupConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let config = loader()
            .parse(
                r#"
                exclude_updades = ["Arq", "fork"]
                greedy_casks = true
                homebrew_command = "/opt/homebrew/bin/brew"
                reopen_casks = ["fork"]
                no_quarantine = ["arq"]
                app_dir = "~/Applications"
                "#,
            )
            .unwrap();

        assert_eq!(config.exclude_updades, vec!["Arq", "fork"]);
        assert!(config.greedy_casks);
        assert_eq!(config.homebrew_command, "/opt/homebrew/bin/brew");
        assert_eq!(config.app_dir.as_deref(), Some("~/Applications"));
        assert!(config.reopens("FORK"));
        assert!(config.skips_quarantine("ARQ"));
    }

    #[test]
    fn exclusion_is_case_insensitive() {
        let config = BrewupConfig {
            exclude_updades: vec!["Arq".to_string()],
            ..BrewupConfig::default()
        };
        assert!(config.is_excluded("arq"));
        assert!(config.is_excluded("ARQ"));
        assert!(!config.is_excluded("fork"));
    }

    #[test]
    fn reports_each_invalid_field() {
        let err = loader()
            .parse(
                r#"
                greedy_casks = "yes"
                exclude_updades = "arq"
                "#,
            )
            .unwrap_err();

        match err {
            BrewupError::InvalidConfig { errors, .. } => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["exclude_updades", "greedy_casks"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_syntax_errors() {
        let err = loader().parse("greedy_casks = ").unwrap_err();
        assert!(matches!(err, BrewupError::InvalidConfig { .. }));
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let loader = ConfigLoader::new(&path);

        // Only the file creation is under test; `brew` may be absent here.
        let _ = loader.load();

        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }

    #[cfg(unix)]
    #[test]
    fn load_rejects_missing_homebrew_command() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "homebrew_command = \"brewup-no-such-brew\"\n").unwrap();

        let err = ConfigLoader::new(&path).load().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("homebrew_command"));
        assert!(message.contains("brewup-no-such-brew is not available in the PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn load_accepts_explicit_command_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let brew = dir.path().join("brew");
        fs::write(&brew, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&brew, fs::Permissions::from_mode(0o755)).unwrap();

        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!("homebrew_command = \"{}\"\n", brew.display()),
        )
        .unwrap();

        let config = ConfigLoader::new(&path).load().unwrap();
        assert_eq!(config.homebrew_command, brew.display().to_string());
    }
}
