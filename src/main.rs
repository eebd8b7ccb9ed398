//! Binary entry point that glues the SQLite-backed store to the TUI: read the
//! configuration, start logging, load stored workouts, locate the user and run
//! the Ratatui event loop until they quit.
use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use env_logger::{Env, Target};
use log::info;

use workout_mapper::{
    ensure_schema, run_app, App, Config, ConfiguredLocation, Controller, Frontend, SqliteStorage,
};

/// Returning a `Result` surfaces fatal start-up problems (an unwritable data
/// directory, a malformed variable) on the terminal instead of a panic.
fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(&config)?;
    info!("data directory: {}", config.data_dir.display());

    let conn = ensure_schema(&config.database_path())?;
    let storage = SqliteStorage::new(conn, &config.storage_key);
    info!("workouts stored under key {:?}", storage.key());

    let mut controller = Controller::start(storage, Frontend::default(), config.zoom)
        .context("failed to load stored workouts")?;
    controller.locate(&ConfiguredLocation(config.home));

    let mut app = App::new(controller);
    run_app(&mut app)
}

/// Log to a file under the data directory; stderr belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
