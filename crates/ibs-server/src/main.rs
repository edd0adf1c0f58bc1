//! Direktori IBS server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `IBS_*`
//! environment overrides, opens the SQLite store, optionally seeds the region
//! tables from a CSV file, and serves the JSON API under `/api`.
//!
//! ```text
//! ibs-server --config config.toml
//! IBS_PORT=9000 IBS_REGIONS_PATH=wilayah.csv ibs-server
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use ibs_api::{AppState, ServerConfig};
use ibs_core::{lookup::RegionRow, store::DirectoryStore as _};
use ibs_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Direktori IBS admin API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("IBS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let db_path = expand_tilde(&server_cfg.database_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open database at {db_path:?}"))?;

  if let Some(path) = &server_cfg.regions_path {
    let path = expand_tilde(path);
    let rows = read_regions(&path)
      .with_context(|| format!("failed to read regions from {path:?}"))?;
    store
      .load_regions(rows)
      .await
      .context("failed to load regions")?;
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = ibs_api::app(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Parse a `kd_kec,nm_kec,kd_desa,nm_desa` file with a header row.
fn read_regions(path: &Path) -> anyhow::Result<Vec<RegionRow>> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_path(path)?;
  let rows = reader
    .deserialize()
    .collect::<Result<Vec<RegionRow>, _>>()?;
  Ok(rows)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
