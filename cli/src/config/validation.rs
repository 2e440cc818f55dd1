use super::app::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid sync.query_param: '{value}'")]
    QueryParam { value: String },
    #[error("Invalid sync.storage_key: '{value}'")]
    StorageKey { value: String },
    #[error("Invalid logging.level: '{value}'")]
    LogLevel { value: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::QueryParam { value } => {
                format!(
                    "Query parameter name is not URL-safe!\n\n\
                    Your configured value: '{value}'\n\
                    Allowed characters: letters, digits, '-', '_', '.', '~'\n\n\
                    Please update query_param in the [sync] section, or set it to \"\" to disable URL sync."
                )
            }
            ConfigValidationError::StorageKey { value } => {
                format!(
                    "Storage key contains only whitespace!\n\n\
                    Your configured value: '{value}'\n\n\
                    Please update storage_key in the [sync] section, or set it to \"\" to disable persistence."
                )
            }
            ConfigValidationError::LogLevel { value } => {
                format!(
                    "Unknown log level!\n\n\
                    Your configured value: '{value}'\n\
                    Valid levels: trace, debug, info, warn, error, off\n\n\
                    Please update level in the [logging] section."
                )
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
    Invalid(Vec<ConfigValidationError>),
}

impl ConfigLoadResult {
    /// Collapses the outcome into the application's error type.
    pub fn into_result(self) -> crate::error::AppResult<AppConfig> {
        use crate::error::AppError;

        match self {
            ConfigLoadResult::Success(config) => Ok(*config),
            ConfigLoadResult::LoadError(msg) | ConfigLoadResult::DeserializeError(msg) => {
                Err(AppError::Config(msg))
            }
            ConfigLoadResult::Invalid(errors) => {
                let messages: Vec<String> = errors.iter().map(|e| e.user_message()).collect();
                Err(AppError::Config(format!(
                    "Configuration validation failed:\n{}",
                    messages.join("\n\n")
                )))
            }
        }
    }
}
