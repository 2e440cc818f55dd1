use serde::{Deserialize, Serialize};

/// A named collection of one or more style blocks.
///
/// Only `id` is required. Optional fields stay `None` rather than taking a
/// default so that merging a partial update never erases what an earlier
/// registration provided.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_theme: Option<bool>,
}

impl Theme {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default_theme: bool) -> Self {
        self.default_theme = Some(default_theme);
        self
    }

    /// Whether the theme carries a usable identifier.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_default(&self) -> bool {
        self.default_theme.unwrap_or(false)
    }

    /// Shallow merge: every field set in `update` overwrites ours, fields it
    /// leaves unset keep their current value.
    pub fn merge(&mut self, update: &Theme) {
        if update.has_id() {
            self.id = update.id.clone();
        }
        if let Some(display_name) = &update.display_name {
            self.display_name = Some(display_name.clone());
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(default_theme) = update.default_theme {
            self.default_theme = Some(default_theme);
        }
    }
}

/// Picks the theme flagged as default, or the first one when none is.
pub fn default_or_first(themes: &[Theme]) -> Option<&Theme> {
    themes
        .iter()
        .find(|theme| theme.is_default())
        .or_else(|| themes.first())
}
