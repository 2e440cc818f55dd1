use anyhow::Context;
use clap::Parser;
use themesync::args::Cli;
use themesync::{commands, config, logger};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = config::load_config(cli.config.as_deref())
        .into_result()
        .context("Failed to load configuration")?;
    config::init_global(app_config);

    if let Err(e) = logger::setup_logger(cli.verbose) {
        eprintln!("Warning: Failed to initialize logger: {e}");
    }

    commands::run(&cli, config::get_config_or_default())?;
    Ok(())
}
