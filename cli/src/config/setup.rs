use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "themesync";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";
const STYLES_DIR: &str = "styles";

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum SetupError {
    #[error("Failed to determine config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to create directory {path}: {source}")]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn get_config_dir() -> Result<PathBuf, SetupError> {
    // Prefer ~/.config/themesync on Unix-like systems, fall back to platform defaults
    if cfg!(unix) {
        if let Some(mut home_path) = dirs::home_dir() {
            home_path.push(".config");
            home_path.push(APP_DIR);
            return Ok(home_path);
        }
    }

    dirs::config_dir()
        .map(|mut path| {
            path.push(APP_DIR);
            path
        })
        .ok_or_else(|| {
            SetupError::ConfigDirError("Unable to determine config directory".to_string())
        })
}

pub fn get_config_file_path() -> Result<PathBuf, SetupError> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Where the selected theme is persisted when nothing else is configured.
pub fn get_state_file_path() -> Result<PathBuf, SetupError> {
    Ok(get_config_dir()?.join(STATE_FILE))
}

pub fn get_styles_dir() -> Result<PathBuf, SetupError> {
    Ok(get_config_dir()?.join(STYLES_DIR))
}

/// Creates the parent directory of `file` when it does not exist yet.
pub fn ensure_parent_dir(file: &Path) -> Result<(), SetupError> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_if_not_exists(parent),
        _ => Ok(()),
    }
}

fn create_dir_if_not_exists(path: &Path) -> Result<(), SetupError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| SetupError::CreateDirError {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Created directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_config_dir() {
        let Ok(dir) = get_config_dir() else {
            return;
        };

        assert!(dir.ends_with(APP_DIR));
        assert_eq!(get_state_file_path().unwrap(), dir.join(STATE_FILE));
        assert_eq!(get_styles_dir().unwrap(), dir.join(STYLES_DIR));
        assert_eq!(get_config_file_path().unwrap(), dir.join(CONFIG_FILE));
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a").join("b").join("state.json");

        ensure_parent_dir(&file).unwrap();

        assert!(temp.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_accepts_bare_file_names() {
        assert!(ensure_parent_dir(Path::new("state.json")).is_ok());
    }
}
