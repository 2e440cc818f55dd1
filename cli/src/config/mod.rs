use config::{Config, Environment, File};
use once_cell::sync::{Lazy, OnceCell};
use std::path::Path;

pub mod app;
pub mod setup;
pub mod validation;

pub use app::{AppConfig, LoggingConfig, StorageConfig, StylesConfig};
pub use validation::{ConfigLoadResult, ConfigValidationError};

/// Prefix of environment overrides, e.g. `THEMESYNC__SYNC__QUERY_PARAM=look`.
pub const ENV_PREFIX: &str = "THEMESYNC";

static CONFIG: OnceCell<AppConfig> = OnceCell::new();
static DEFAULT_CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::default);

/// Loads configuration from `path` (or the default config file when it
/// exists) layered under environment variables, then validates it.
///
/// An explicitly given file must exist; the default one is optional.
pub fn load_config(path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let file_source = match path {
        Some(path) => File::from(path).required(true),
        None => match setup::get_config_file_path() {
            Ok(default_path) => File::from(default_path).required(false),
            Err(e) => return ConfigLoadResult::LoadError(e.to_string()),
        },
    };
    let env_source = Environment::with_prefix(ENV_PREFIX).separator("__");

    let config = match Config::builder()
        .add_source(file_source)
        .add_source(env_source) // environment entries override file values when present
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => {
            if let Err(errors) = app_config.validate() {
                return ConfigLoadResult::Invalid(errors);
            }
            ConfigLoadResult::Success(Box::new(app_config))
        }
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

/// Installs the process-wide configuration. Returns `false` if one was
/// already installed, in which case `config` is dropped.
pub fn init_global(config: AppConfig) -> bool {
    CONFIG.set(config).is_ok()
}

pub fn get_config() -> Option<&'static AppConfig> {
    CONFIG.get()
}

/// The installed configuration, or built-in defaults before installation.
pub fn get_config_or_default() -> &'static AppConfig {
    CONFIG.get().unwrap_or_else(|| &*DEFAULT_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use std::fs;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_from_explicit_file() {
        let (_dir, path) = write_config(
            r#"
            [sync]
            query_param = "look"

            [styles]
            dir = "/srv/styles"

            [logging]
            level = "debug"
            "#,
        );

        let config = load_config(Some(&path)).into_result().unwrap();

        assert_some_eq!(config.sync().query_param(), "look");
        assert_some_eq!(config.sync().storage_key(), engine::options::DEFAULT_STORAGE_KEY);
        assert_some_eq!(config.styles().dir(), Path::new("/srv/styles"));
        assert_eq!(config.logging().level(), "debug");
    }

    #[test]
    fn test_empty_strings_disable_sync_sources() {
        let (_dir, path) = write_config("[sync]\nstorage_key = \"\"\nquery_param = \"\"\n");

        let config = load_config(Some(&path)).into_result().unwrap();

        assert_none!(config.sync().storage_key());
        assert_none!(config.sync().query_param());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_config(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, ConfigLoadResult::LoadError(_)));
    }

    #[test]
    fn test_invalid_values_are_collected() {
        let (_dir, path) = write_config("[sync]\nquery_param = \"a b\"\n\n[logging]\nlevel = \"chatty\"\n");

        match load_config(Some(&path)) {
            ConfigLoadResult::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_before_install() {
        assert_eq!(get_config_or_default().logging().level(), "info");
    }
}
