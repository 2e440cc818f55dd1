use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application-wide error type for the themesync command-line host.
///
/// The engine itself never fails; everything here comes from the edges:
/// loading configuration, reading stylesheets, persisting state and writing
/// command output.
///
/// # Examples
///
/// ```no_run
/// use themesync::error::{AppError, AppResult};
///
/// fn require_theme(id: &str, known: &[String]) -> AppResult<()> {
///     if known.iter().any(|k| k == id) {
///         Ok(())
///     } else {
///         Err(AppError::Theme(format!("Unknown theme '{id}'")))
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading and validation errors.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// A theme could not be selected or the styles directory is unusable.
    #[error("Theme Error: {0}")]
    Theme(String),

    /// The state file exists but cannot be interpreted.
    #[error("Storage Error: {0}")]
    Storage(String),

    /// Reading or writing a specific file failed.
    #[error("I/O Error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing command output failed.
    #[error("Output Error: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<crate::config::setup::SetupError> for AppError {
    fn from(err: crate::config::setup::SetupError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
