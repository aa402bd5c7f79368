use crate::error::{BrewupError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Target of the final run error; kept out of the console layer.
pub const FAILURE_TARGET: &str = "brewup::failure";

/// Map the `-v` count onto a level: 0=INFO, 1=DEBUG, 2+=TRACE.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Console and optional file logging settings.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl LoggingOptions {
    pub fn new(verbosity: u8, log_file: Option<PathBuf>) -> Self {
        Self {
            level: level_for_verbosity(verbosity),
            log_file,
        }
    }
}

/// Keeps the file writer alive; logs still buffered are flushed on drop.
#[must_use = "dropping the guard stops the background log writer"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init(options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(options.level.into())
        .from_env_lossy();

    let console = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|meta| meta.target() != FAILURE_TARGET))
        .boxed();

    let (file_layer, guard) = match &options.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| BrewupError::Logging(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| BrewupError::Logging(format!("{} is not a file", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&directory).map_err(|e| {
        BrewupError::Logging(format!(
            "Failed to create log directory {}: {e}",
            directory.display()
        ))
    })?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
