//! # Themesync
//!
//! Command-line host for the themesync engine. Stylesheets in a directory
//! declare themes with `@@id` annotations; the active theme is resolved from
//! a page URL, a JSON state file or the stylesheets themselves, and can be
//! listed, switched and bundled from the command line.
//!
//! ## Modules
//!
//! - [`args`] - Command-line definitions
//! - [`commands`] - Command execution against a session
//! - [`config`] - Configuration loading, validation and platform paths
//! - [`error`] - Application error type
//! - [`logger`] - Log output setup
//! - [`session`] - One engine run over a styles directory and a state file
//! - [`theme`] - Stylesheet loading, state persistence and theme validation
//! - [`validation`] - The `Validator` trait

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod session;
pub mod theme;
pub mod validation;
