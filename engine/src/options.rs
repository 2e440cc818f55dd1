use serde::Deserialize;

/// Storage key the selected theme is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "themesync.theme";
/// Query parameter mirroring the selected theme unless configured otherwise.
pub const DEFAULT_QUERY_PARAM: &str = "theme";

fn default_storage_key() -> Option<String> {
    Some(DEFAULT_STORAGE_KEY.to_string())
}

fn default_query_param() -> Option<String> {
    Some(DEFAULT_QUERY_PARAM.to_string())
}

/// Which external sources the coordinator keeps in sync.
///
/// A missing field takes its default; an explicit empty string disables
/// that source entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncOptions {
    #[serde(default = "default_storage_key")]
    storage_key: Option<String>,
    #[serde(default = "default_query_param")]
    query_param: Option<String>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Neither storage nor URL sync.
    pub fn disabled() -> Self {
        Self {
            storage_key: None,
            query_param: None,
        }
    }

    pub fn with_storage_key(mut self, key: Option<impl Into<String>>) -> Self {
        self.storage_key = key.map(Into::into);
        self
    }

    pub fn with_query_param(mut self, param: Option<impl Into<String>>) -> Self {
        self.query_param = param.map(Into::into);
        self
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn query_param(&self) -> Option<&str> {
        self.query_param.as_deref().filter(|param| !param.is_empty())
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            query_param: default_query_param(),
        }
    }
}
