use crate::args::{Cli, Command};
use crate::config::{AppConfig, setup};
use crate::error::{AppError, AppResult};
use crate::session::{SessionOptions, ThemeSession};
use engine::Theme;
use serde::Serialize;
use std::fs;
use std::io::Write;

#[derive(Serialize)]
struct ThemeEntry<'a> {
    #[serde(flatten)]
    theme: &'a Theme,
    active: bool,
}

/// Session options from the command line, falling back to configuration and
/// then to the platform directories.
pub fn session_options(cli: &Cli, config: &AppConfig) -> AppResult<SessionOptions> {
    let styles_dir = match cli.styles.as_deref().or(config.styles().dir()) {
        Some(dir) => dir.to_path_buf(),
        None => setup::get_styles_dir()?,
    };
    let state_file = match cli.state.as_deref().or(config.storage().file()) {
        Some(file) => file.to_path_buf(),
        None => setup::get_state_file_path()?,
    };

    Ok(SessionOptions::new(styles_dir, state_file)
        .with_url(cli.url.clone())
        .with_sync(config.sync().clone()))
}

/// Opens a session, runs the requested command against it and closes it.
pub fn run(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let session = ThemeSession::open(session_options(cli, config)?)?;
    let stdout = std::io::stdout();
    let result = execute(&cli.command, &session, &mut stdout.lock());
    session.close();
    result
}

pub fn execute(command: &Command, session: &ThemeSession, out: &mut dyn Write) -> AppResult<()> {
    match command {
        Command::List { json } => list(session, *json, out),
        Command::Current => {
            match session.current() {
                Some(id) => writeln!(out, "{id}")?,
                None => writeln!(out, "(none)")?,
            }
            print_url(session, out)
        }
        Command::Select { id } => {
            session.select(id)?;
            writeln!(out, "Selected theme '{id}'")?;
            print_url(session, out)
        }
        Command::Bundle { output } => {
            let bundle = session.bundle();
            match output {
                Some(path) => {
                    fs::write(path, &bundle).map_err(|e| AppError::io(path, e))?;
                    log::info!("Wrote {} bytes to {}", bundle.len(), path.display());
                }
                None => out.write_all(bundle.as_bytes())?,
            }
            Ok(())
        }
    }
}

fn list(session: &ThemeSession, json: bool, out: &mut dyn Write) -> AppResult<()> {
    let themes = session.themes();
    let current = session.current();
    let is_active = |theme: &Theme| current.as_deref() == Some(theme.id.as_str());

    if json {
        let entries: Vec<ThemeEntry> = themes
            .iter()
            .map(|theme| ThemeEntry {
                theme,
                active: is_active(theme),
            })
            .collect();
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| AppError::Theme(format!("Failed to render theme list: {e}")))?;
        writeln!(out, "{rendered}")?;
        return Ok(());
    }

    if themes.is_empty() {
        writeln!(out, "No themes found")?;
        return Ok(());
    }

    let width = themes.iter().map(|t| t.id.chars().count()).max().unwrap_or(0);
    for theme in &themes {
        let marker = if is_active(theme) { '*' } else { ' ' };
        write!(out, "{marker} {:<width$}  {}", theme.id, theme.display_name())?;
        if let Some(description) = &theme.description {
            write!(out, " - {description}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn print_url(session: &ThemeSession, out: &mut dyn Write) -> AppResult<()> {
    if let Some(url) = session.url() {
        writeln!(out, "{url}")?;
    }
    Ok(())
}
