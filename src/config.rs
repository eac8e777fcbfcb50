//! Application configuration.
//!
//! Remote credentials come from the environment (`SHOPLOG_REMOTE_URL` and
//! `SHOPLOG_REMOTE_KEY`); their absence is not an error, it selects local
//! mode. Local settings (data directory, storage namespace, poll interval)
//! are read from an optional `config.toml`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const ENV_REMOTE_URL: &str = "SHOPLOG_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "SHOPLOG_REMOTE_KEY";
pub const ENV_CONFIG_PATH: &str = "SHOPLOG_CONFIG";

const DEFAULT_NAMESPACE: &str = "shoplog";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_POLL_SECS: u64 = 5;

/// Credentials for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    /// Present is not enough: malformed credentials are treated the same as
    /// absent ones by the connectivity path.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        (self.url.starts_with("http://") || self.url.starts_with("https://"))
            && !self.anon_key.trim().is_empty()
    }
}

/// Optional settings file shape.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    namespace: Option<String>,
    poll_interval_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when the environment carries no credentials.
    pub remote: Option<RemoteConfig>,
    /// Directory holding the local persistence mirror.
    pub data_dir: PathBuf,
    /// Key prefix for persisted collections.
    pub namespace: String,
    /// Snapshot interval for push channels.
    pub poll_interval: Duration,
}

/// Loads the full application configuration from environment and the
/// optional settings file.
///
/// # Errors
/// Returns [`Error::Config`] only when a settings file exists but does not
/// parse; everything else has a default.
pub fn load_app_configuration() -> Result<AppConfig> {
    let remote = match (
        std::env::var(ENV_REMOTE_URL),
        std::env::var(ENV_REMOTE_KEY),
    ) {
        (Ok(url), Ok(anon_key)) => Some(RemoteConfig { url, anon_key }),
        _ => {
            info!("no remote credentials in environment");
            None
        }
    };

    let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config.toml".to_string());
    let file = match std::fs::read_to_string(&path) {
        Ok(text) => toml::from_str::<FileConfig>(&text)
            .map_err(|e| Error::Config(format!("{path}: {e}")))?,
        Err(_) => {
            debug!(path, "no settings file, using defaults");
            FileConfig::default()
        }
    };

    Ok(AppConfig {
        remote,
        data_dir: file
            .data_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        namespace: file
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        poll_interval: Duration::from_secs(file.poll_interval_secs.unwrap_or(DEFAULT_POLL_SECS)),
    })
}
