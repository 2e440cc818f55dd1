//! Command-line argument definitions using clap derive macros.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// Discover, select and bundle themes embedded in stylesheets
#[derive(Debug, Parser)]
#[command(name = "themesync", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: <config dir>/themesync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the *.css stylesheets
    #[arg(long, global = true)]
    pub styles: Option<PathBuf>,

    /// JSON file the selected theme is persisted in
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Page URL whose query parameter mirrors the selected theme
    #[arg(long, global = true)]
    pub url: Option<Url>,

    /// Raise log verbosity (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List discovered themes, marking the active one
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the active theme
    Current,
    /// Select and persist a theme
    Select {
        /// Theme id as declared by @@id
        id: String,
    },
    /// Print the stylesheet text in effect for the active theme
    Bundle {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "themesync",
            "select",
            "dark",
            "--styles",
            "./styles",
            "--url",
            "https://app.test/?theme=light",
            "-vv",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Select { ref id } if id == "dark"));
        assert_eq!(cli.styles, Some(PathBuf::from("./styles")));
        assert_eq!(cli.url.unwrap().query(), Some("theme=light"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(Cli::try_parse_from(["themesync", "current", "--url", "not a url"]).is_err());
    }

    #[test]
    fn test_bundle_output() {
        let cli = Cli::try_parse_from(["themesync", "bundle", "-o", "out.css"]).unwrap();

        assert!(matches!(cli.command, Command::Bundle { output: Some(_) }));
    }
}
