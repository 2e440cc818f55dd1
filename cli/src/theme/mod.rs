//! # Theme Host Module
//!
//! Filesystem side of the theme system: stylesheets are read from a styles
//! directory into an in-memory document, and the selected theme is persisted
//! in a JSON state file.
//!
//! - **[`StylesheetLoader`]** - Reads `*.css` files into a document, one block per file
//! - **[`FileStore`]** - Storage backend persisted as a JSON object
//! - **Theme Validation** - Checks user-supplied ids and the styles directory

pub mod file_store;
pub mod loader;
pub mod validation;

pub use file_store::FileStore;
pub use loader::{SOURCE_ATTR, StylesheetLoader};
pub use validation::{StylesDirValidator, ThemeIdValidator, ThemeValidationError};
