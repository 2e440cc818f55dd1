//! # Themesync Engine
//!
//! Core library for stylesheet-embedded themes: it discovers theme blocks in
//! a document, tracks the active theme, persists the selection and keeps
//! every context sharing the same store in sync.
//!
//! The engine is single-threaded and event driven. Components talk through
//! synchronous multicast streams, and all host services (storage, the style
//! container, navigation, deferral) sit behind traits with in-memory
//! implementations included.
//!
//! ## Modules
//!
//! - [`annotation`] - `@@tag value` metadata extraction from stylesheet text
//! - [`coordinator`] - Initial-theme resolution and multi-source sync
//! - [`discovery`] - Style block scanning, tagging and activation
//! - [`dom`] - Style container abstraction and in-memory document
//! - [`navigation`] - Location abstraction and query-parameter helpers
//! - [`options`] - Storage key and query parameter configuration
//! - [`registry`] - The set of known themes
//! - [`scheduler`] - Next-turn deferral
//! - [`storage`] - Key-value store with change notifications
//! - [`stream`] - Multicast streams and subscriptions
//! - [`theme`] - The theme value type
//! - [`tracker`] - The active theme identifier

pub mod annotation;
pub mod coordinator;
pub mod discovery;
pub mod dom;
pub mod navigation;
pub mod options;
pub mod registry;
pub mod scheduler;
pub mod storage;
pub mod stream;
pub mod theme;
pub mod tracker;

pub use coordinator::{Platform, ThemeCoordinator};
pub use options::SyncOptions;
pub use theme::Theme;
