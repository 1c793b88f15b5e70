//! checkin-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `CHECKIN_*` environment variables, opens the local workbook, connects the
//! Drive mirror, and serves the check-in API over HTTP.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `CHECKIN_MIRROR__ROOT_FOLDER_ID`.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context as _;
use checkin_core::SyncCoordinator;
use checkin_drive::{DriveMirror, HttpDriveApi, ServiceAccountKey, TokenProvider};
use checkin_server::{AppState, Credentials, ServerConfig, config::expand_tilde};
use checkin_store_xlsx::TableStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Check-in recorder with a Google Drive mirror")]
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
    .add_source(
      config::Environment::with_prefix("CHECKIN")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("allowed_origins")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Mirror.
  let tokens = match server_cfg.mirror.credentials().context("invalid [mirror] configuration")? {
    Credentials::KeyFile(path) => {
      let key = ServiceAccountKey::from_file(&path)
        .with_context(|| format!("failed to load service account key {path:?}"))?;
      tracing::info!(account = %key.client_email, "using service account credentials");
      TokenProvider::service_account(key)
    }
    Credentials::AccessToken(token) => TokenProvider::bearer(token),
  };
  let timeout = Duration::from_secs(server_cfg.mirror.timeout_secs);
  let api = HttpDriveApi::new(server_cfg.mirror.api_base_url.clone(), tokens, timeout)
    .context("failed to build Drive client")?;
  let mirror = DriveMirror::new(api, server_cfg.mirror.settings());

  // Local table.
  let table_path = expand_tilde(&server_cfg.table_path);
  let store = TableStore::new(table_path.clone()).with_sheet_name(server_cfg.sheet_name.clone());
  tracing::info!(path = ?table_path, "using local table");

  let coordinator = SyncCoordinator::new(store, mirror).with_mirror_timeout(timeout);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = checkin_server::router(AppState::new(coordinator, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}
