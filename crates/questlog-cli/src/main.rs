//! Questlog library import
//!
//! Runs one Steam import for one user against the local library database and
//! prints the resulting report as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use questlog_config::ImportConfig;
use questlog_import::{ImportMode, ImportPipeline, ImportRequest};
use questlog_library::{PreferencesStore, SqliteLibraryStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "questlog-import", version, about = "Import a Steam library into Questlog")]
struct Cli {
    /// Library owner the records are written for
    #[arg(long)]
    user: String,

    /// Steam vanity name, profile URL or SteamID64
    #[arg(long)]
    account: String,

    /// `new` or `full`; defaults to the user's stored preference
    #[arg(long)]
    mode: Option<ImportMode>,

    /// Config file; otherwise the user and system config dirs are searched
    #[arg(long)]
    config: Option<PathBuf>,

    /// Library database path
    #[arg(long, default_value = "questlog.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() {
    setup_logging();

    if let Err(e) = run(Cli::parse()).await {
        error!("Import failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ImportConfig::load_layered(Some(path.as_path()), None),
        None => ImportConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    let store = Arc::new(
        SqliteLibraryStore::open(&cli.db)
            .with_context(|| format!("Failed to open library database {}", cli.db.display()))?,
    );

    let mode = match cli.mode {
        Some(mode) => mode,
        None => {
            let prefs = store
                .import_preferences(&cli.user)
                .await
                .context("Failed to read import preferences")?;
            ImportMode::from_preferences(&prefs)
        }
    };

    let pipeline = ImportPipeline::with_http_clients(config, store.clone(), store)
        .context("Failed to set up import pipeline")?;

    info!("Importing {} for {} ({} mode)", cli.account, cli.user, mode);
    let request = ImportRequest::new(cli.account, mode);
    let report = pipeline
        .import_library(&cli.user, &request)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Setup logging
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_is_optional() {
        let cli = Cli::parse_from(["questlog-import", "--user", "alice", "--account", "gaben"]);
        assert!(cli.mode.is_none());
        assert_eq!(cli.db, PathBuf::from("questlog.db"));

        let cli = Cli::parse_from([
            "questlog-import",
            "--user",
            "alice",
            "--account",
            "gaben",
            "--mode",
            "FULL",
        ]);
        assert_eq!(cli.mode, Some(ImportMode::Full));
    }
}
