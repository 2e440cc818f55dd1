use crate::error::AppError;
use crate::validation::Validator;
use std::path::Path;

const MAX_ID_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeValidationError {
    #[error("Invalid theme id '{id}': {reason}")]
    InvalidThemeId { id: String, reason: String },
    #[error("Unknown theme '{id}'")]
    UnknownTheme { id: String, available: Vec<String> },
    #[error("Invalid styles directory '{path}': {reason}")]
    InvalidStylesDir { path: String, reason: String },
}

impl ThemeValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ThemeValidationError::InvalidThemeId { id, reason } => {
                format!(
                    "Invalid theme id: '{id}'\n\n\
                    Reason: {reason}"
                )
            }
            ThemeValidationError::UnknownTheme { id, available } => {
                if available.is_empty() {
                    format!(
                        "Unknown theme: '{id}'\n\n\
                        No themes were discovered. Add stylesheets with an '@@id' annotation to the styles directory."
                    )
                } else {
                    format!(
                        "Unknown theme: '{id}'\n\n\
                        Available themes: {}",
                        available.join(", ")
                    )
                }
            }
            ThemeValidationError::InvalidStylesDir { path, reason } => {
                format!(
                    "Invalid styles directory: '{path}'\n\n\
                    Reason: {reason}\n\n\
                    Please pass --styles or set dir in the [styles] section."
                )
            }
        }
    }
}

impl From<ThemeValidationError> for AppError {
    fn from(error: ThemeValidationError) -> Self {
        AppError::Theme(error.user_message())
    }
}

/// Checks the shape of a theme id typed by the user.
pub struct ThemeIdValidator;

impl Validator<str> for ThemeIdValidator {
    type Error = ThemeValidationError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let invalid = |reason: &str| ThemeValidationError::InvalidThemeId {
            id: input.to_string(),
            reason: reason.to_string(),
        };

        if input.trim().is_empty() {
            return Err(invalid("Id cannot be empty"));
        }
        if input.trim() != input {
            return Err(invalid("Id cannot start or end with whitespace"));
        }
        if input.chars().count() > MAX_ID_LEN {
            return Err(invalid("Id too long (max 100 characters)"));
        }
        if input.chars().any(char::is_control) {
            return Err(invalid("Id contains control characters"));
        }

        Ok(())
    }
}

pub struct StylesDirValidator;

impl Validator<Path> for StylesDirValidator {
    type Error = ThemeValidationError;

    fn validate(&self, input: &Path) -> Result<(), Self::Error> {
        let invalid = |reason: &str| ThemeValidationError::InvalidStylesDir {
            path: input.display().to_string(),
            reason: reason.to_string(),
        };

        if !input.exists() {
            return Err(invalid("Directory does not exist"));
        }
        if !input.is_dir() {
            return Err(invalid("Path is not a directory"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn test_theme_id_validation() {
        assert_ok!(ThemeIdValidator.validate("dark"));
        assert_ok!(ThemeIdValidator.validate("high contrast"));
        assert_err!(ThemeIdValidator.validate(""));
        assert_err!(ThemeIdValidator.validate("   "));
        assert_err!(ThemeIdValidator.validate(" dark"));
        assert_err!(ThemeIdValidator.validate("da\u{7}rk"));
        assert_err!(ThemeIdValidator.validate(&"x".repeat(101)));
    }

    #[test]
    fn test_styles_dir_validation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dark.css");
        std::fs::write(&file, "").unwrap();

        assert_ok!(StylesDirValidator.validate(dir.path()));
        assert_err!(StylesDirValidator.validate(&file));
        assert_err!(StylesDirValidator.validate(&dir.path().join("missing")));
    }

    #[test]
    fn test_unknown_theme_lists_alternatives() {
        let error = ThemeValidationError::UnknownTheme {
            id: "sepia".to_string(),
            available: vec!["light".to_string(), "dark".to_string()],
        };

        assert!(error.user_message().contains("light, dark"));
        assert!(matches!(AppError::from(error), AppError::Theme(_)));
    }
}
