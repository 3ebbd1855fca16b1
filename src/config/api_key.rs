use crate::config::settings::AppSettings;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Where to look for the Google Maps API key.
///
/// Lookup order is the process environment, then the same variable in a
/// `.env` file (which never overrides a real environment variable), then
/// `[google] api_key` in the TOML settings file.
#[derive(Debug, Clone)]
pub struct ApiKeySource {
    env_var: String,
    dotenv_path: PathBuf,
    config_path: PathBuf,
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self::new("config.toml")
    }
}

impl ApiKeySource {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: API_KEY_ENV.to_string(),
            dotenv_path: PathBuf::from(".env"),
            config_path: config_path.into(),
        }
    }

    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    pub fn with_dotenv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_path = path.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Option<String> {
        if let Some(key) = non_empty(std::env::var(&self.env_var).ok()) {
            tracing::debug!("API key loaded from environment");
            return Some(key);
        }

        if let Some(key) = self.from_dotenv() {
            tracing::debug!("API key loaded from {}", self.dotenv_path.display());
            return Some(key);
        }

        if let Some(key) = self.from_config_file() {
            tracing::debug!("API key loaded from {}", self.config_path.display());
            return Some(key);
        }

        None
    }

    /// Reads the variable from the `.env` file without touching the process
    /// environment. The last assignment wins; a malformed line ends the scan.
    fn from_dotenv(&self) -> Option<String> {
        let entries = dotenvy::from_path_iter(&self.dotenv_path).ok()?;
        let mut found = None;
        for entry in entries {
            match entry {
                Ok((key, value)) if key == self.env_var => found = Some(value),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Stopped reading {}: {}", self.dotenv_path.display(), e);
                    break;
                }
            }
        }
        non_empty(found)
    }

    fn from_config_file(&self) -> Option<String> {
        if !self.config_path.exists() {
            return None;
        }
        // 設定檔無法讀取時視為沒有金鑰
        match AppSettings::from_file(&self.config_path) {
            Ok(settings) => settings.google.resolved_api_key(),
            Err(e) => {
                tracing::debug!(
                    "Ignoring unreadable settings file {}: {}",
                    self.config_path.display(),
                    e
                );
                None
            }
        }
    }
}

pub fn load_api_key() -> Option<String> {
    ApiKeySource::default().load()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
