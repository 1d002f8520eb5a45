use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use termsweeper::{App, Cli, HistoryStore, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut settings =
        Settings::discover(cli.config.as_deref(), &data_dir).context("Could not load settings")?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }
    if cli.no_color {
        settings.color = false;
    }
    log::info!("starting with {:?}", settings);

    let store = HistoryStore::new(settings.data_dir.clone());
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    App::new(stdin, stdout, settings, store)
        .with_seed(cli.seed)
        .with_user(cli.user)
        .run()
}
