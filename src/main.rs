mod analytics;
mod assistant;
mod config;
mod db;
mod error;
mod export;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let settings = config::Settings::load()?;
    let db_path = settings.resolve_db_path()?;
    let interactive = args.len() == 1;

    init_logging(&settings.log_level, &db_path, interactive)?;
    for warning in &settings.warnings {
        tracing::warn!("config: {warning}");
    }
    tracing::debug!(db = %db_path.display(), "opening store");

    let mut db = db::Database::open(&db_path)?;

    if interactive {
        run::as_tui(&mut db, &settings)
    } else {
        run::as_cli(&args, &mut db, &settings)
    }
}

/// `RUST_LOG` wins over the configured level. The dashboard logs to a file
/// beside the database so the alternate screen stays clean.
fn init_logging(level: &str, db_path: &Path, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spendboard={level}")));

    if interactive {
        let path = config::log_path(db_path);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
