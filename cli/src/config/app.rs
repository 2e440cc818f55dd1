use super::validation::ConfigValidationError;
use engine::SyncOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Top-level configuration, deserialized from `config.toml` and
/// `THEMESYNC__SECTION__KEY` environment variables.
///
/// ```toml
/// [sync]
/// storage_key = "themesync.theme"
/// query_param = "theme"
///
/// [styles]
/// dir = "./styles"
///
/// [storage]
/// file = "./state.json"
///
/// [logging]
/// level = "debug"
/// file = "themesync.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    sync: SyncOptions,
    #[serde(default)]
    styles: StylesConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    pub fn sync(&self) -> &SyncOptions {
        &self.sync
    }

    pub fn styles(&self) -> &StylesConfig {
        &self.styles
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Reports every problem at once rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if let Some(param) = self.sync.query_param() {
            if !param.chars().all(is_url_safe) {
                errors.push(ConfigValidationError::QueryParam {
                    value: param.to_string(),
                });
            }
        }

        if let Some(key) = self.sync.storage_key() {
            if key.trim().is_empty() {
                errors.push(ConfigValidationError::StorageKey {
                    value: key.to_string(),
                });
            }
        }

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                errors.push(ConfigValidationError::LogLevel {
                    value: level.clone(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StylesConfig {
    dir: Option<PathBuf>,
}

impl StylesConfig {
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    file: Option<PathBuf>,
}

impl StorageConfig {
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}
