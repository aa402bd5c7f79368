use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrewupError {
    #[error("Could not read configuration file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration file {}:\n{}", .path.display(), format_field_errors(.errors))]
    InvalidConfig {
        path: PathBuf,
        errors: Vec<FieldError>,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Could not run `{command}`{}", indent_stderr(.stderr))]
    HomebrewExecution { command: String, stderr: String },

    #[error("{0}")]
    HomebrewInfo(String),

    #[error("No formula or cask found named '{0}'")]
    PackageNotFound(String),

    #[error("Unexpected output from `{command}`: {source}")]
    UnexpectedOutput {
        command: String,
        source: serde_json::Error,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Cancelled by user")]
    UserCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn indent_stderr(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("    {}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, BrewupError>;
