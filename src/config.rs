use std::path::PathBuf;
use std::time::Duration;

use crate::models::{Filter, Settings};
use crate::remote::{RemoteClient, RemoteError};
use crate::storage::Storage;

pub const ENV_DATA_DIR: &str = "MYDAY_DATA_DIR";
pub const ENV_REMOTE_URL: &str = "MYDAY_REMOTE_URL";

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("myday")
}

/// Effective runtime configuration: settings file, then environment, then explicit overrides.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub remote_url: Option<String>,
    pub request_timeout: Duration,
    pub default_filter: Filter,
}

impl Config {
    pub fn resolve(data_dir: Option<PathBuf>, remote_url: Option<String>, offline: bool) -> Self {
        let data_dir = data_dir
            .or_else(|| non_empty_env(ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let settings = Storage::new(data_dir.clone())
            .load_settings()
            .unwrap_or_else(|err| {
                log::debug!("using default settings: {err}");
                Settings::default()
            });
        Self::from_settings(data_dir, settings, remote_url, offline)
    }

    fn from_settings(
        data_dir: PathBuf,
        settings: Settings,
        remote_url: Option<String>,
        offline: bool,
    ) -> Self {
        let remote_url = if offline {
            None
        } else {
            remote_url
                .or_else(|| non_empty_env(ENV_REMOTE_URL))
                .or(settings.remote_url)
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
        };
        Self {
            data_dir,
            remote_url,
            request_timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
            default_filter: settings.default_filter,
        }
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.data_dir.clone())
    }

    pub fn remote(&self) -> Result<Option<RemoteClient>, RemoteError> {
        self.remote_url
            .as_deref()
            .map(|url| RemoteClient::new(url, self.request_timeout))
            .transpose()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
