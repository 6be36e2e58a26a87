use std::{
    env,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Overrides the configured log level using `EnvFilter` directives.
pub const LOG_ENV_VAR: &str = "PURRVIEW_LOG";

/// Send all logs to the file at `path`.
///
/// The terminal belongs to the UI so nothing is ever logged to it.
pub fn init(path: &Path, level: &str) -> Result<(), LoggingError> {
    let filter = build_filter(env::var(LOG_ENV_VAR).ok(), level)?;
    let file = open_log_file(path)?;
    let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
    tracing_subscriber::registry().with(filter).with(layer).try_init()?;
    Ok(())
}

fn build_filter(directives: Option<String>, level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = directives.unwrap_or_else(|| level.to_string());
    EnvFilter::try_new(&directives).map_err(|e| LoggingError::Filter(directives, e))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open = || {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|e| LoggingError::File(path.to_path_buf(), e))
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("opening log file {0}: {1}")]
    File(PathBuf, io::Error),

    #[error("invalid log filter '{0}': {1}")]
    Filter(String, ParseError),

    #[error(transparent)]
    Init(#[from] TryInitError),
}
