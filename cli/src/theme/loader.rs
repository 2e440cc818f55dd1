use super::validation::StylesDirValidator;
use crate::error::{AppError, AppResult};
use crate::validation::Validator;
use engine::dom::{MemoryDocument, MemoryStyle, StyleBlock};
use std::fs;
use std::path::{Path, PathBuf};

/// Attribute recording the file a style block was read from.
pub const SOURCE_ATTR: &str = "data-source";

const STYLESHEET_EXTENSION: &str = "css";

/// Reads a directory of stylesheets into a document, one block per file.
pub struct StylesheetLoader {
    dir: PathBuf,
}

impl StylesheetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every `*.css` file in the directory, sorted by file name.
    pub fn stylesheet_paths(&self) -> AppResult<Vec<PathBuf>> {
        StylesDirValidator.validate(&self.dir)?;

        let entries = fs::read_dir(&self.dir).map_err(|e| AppError::io(&self.dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| AppError::io(&self.dir, e))?.path();
            let is_stylesheet = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(STYLESHEET_EXTENSION));
            if is_stylesheet {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Appends every stylesheet to `document`. Returns the number of blocks added.
    pub fn load_into(&self, document: &MemoryDocument) -> AppResult<usize> {
        let paths = self.stylesheet_paths()?;

        for path in &paths {
            let text = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
            let style = MemoryStyle::new(text);
            if let Some(name) = path.file_name() {
                style.set_attribute(SOURCE_ATTR, &name.to_string_lossy());
            }
            document.append(style);
        }

        log::debug!(
            "Loaded {} stylesheet(s) from {}",
            paths.len(),
            self.dir.display()
        );
        Ok(paths.len())
    }
}
