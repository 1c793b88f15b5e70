//! Runtime configuration, deserialised from `config.toml` and `CHECKIN_*`
//! environment variables.

use std::path::{Path, PathBuf};

use checkin_drive::{MirrorSettings, http::DEFAULT_API_BASE_URL};
use checkin_store_xlsx::DEFAULT_SHEET_NAME;
use serde::Deserialize;
use thiserror::Error;

// ─── Server ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  /// Reported by `/health`; free-form (`production`, `development`, …).
  #[serde(default = "default_environment")]
  pub environment:          String,
  /// Include internal error messages in 500 responses.
  #[serde(default)]
  pub expose_error_details: bool,
  #[serde(default = "default_table_path")]
  pub table_path:           PathBuf,
  #[serde(default = "default_sheet_name")]
  pub sheet_name:           String,
  /// Origins allowed by CORS. Empty means no cross-origin access.
  #[serde(default)]
  pub allowed_origins:      Vec<String>,
  #[serde(default)]
  pub mirror:               MirrorConfig,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }
fn default_environment() -> String { "production".into() }
fn default_table_path() -> PathBuf { PathBuf::from("check-ins.xlsx") }
fn default_sheet_name() -> String { DEFAULT_SHEET_NAME.into() }

// ─── Mirror ──────────────────────────────────────────────────────────────────

/// The `[mirror]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
  #[serde(default)]
  pub root_folder_id:   String,
  /// Service account JSON key.
  pub credentials_path: Option<PathBuf>,
  /// Pre-issued bearer token; used when no key file is configured.
  pub access_token:     Option<String>,
  #[serde(default = "default_object_name")]
  pub object_name:      String,
  pub group_name:       Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:     u64,
  #[serde(default = "default_api_base_url")]
  pub api_base_url:     String,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      root_folder_id:   String::new(),
      credentials_path: None,
      access_token:     None,
      object_name:      default_object_name(),
      group_name:       None,
      timeout_secs:     default_timeout_secs(),
      api_base_url:     default_api_base_url(),
    }
  }
}

fn default_object_name() -> String { "check-ins.xlsx".into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_api_base_url() -> String { DEFAULT_API_BASE_URL.into() }

/// How the server authenticates to Drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
  KeyFile(PathBuf),
  AccessToken(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("mirror.root_folder_id is not set")]
  MissingRootFolder,

  #[error("neither mirror.credentials_path nor mirror.access_token is set")]
  MissingCredentials,

  #[error("credentials file {0} does not exist")]
  CredentialsNotFound(PathBuf),
}

impl MirrorConfig {
  /// Check the section is usable and pick the credentials. A key file wins
  /// over an access token when both are set.
  pub fn credentials(&self) -> Result<Credentials, ConfigError> {
    if self.root_folder_id.trim().is_empty() {
      return Err(ConfigError::MissingRootFolder);
    }
    if let Some(path) = &self.credentials_path {
      let path = expand_tilde(path);
      if !path.is_file() {
        return Err(ConfigError::CredentialsNotFound(path));
      }
      return Ok(Credentials::KeyFile(path));
    }
    match self.access_token.as_deref().map(str::trim) {
      Some(token) if !token.is_empty() => Ok(Credentials::AccessToken(token.to_owned())),
      _ => Err(ConfigError::MissingCredentials),
    }
  }

  pub fn settings(&self) -> MirrorSettings {
    MirrorSettings {
      root_folder_id: self.root_folder_id.clone(),
      object_name:    self.object_name.clone(),
      group_name:     self.group_name.clone().filter(|g| !g.trim().is_empty()),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
