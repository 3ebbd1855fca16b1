use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Contents of the optional `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub google: GoogleSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

impl GoogleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Configured key, ignoring blanks and unresolved `${VAR}` placeholders.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.contains("${"))
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_radius: u32,
    pub max_pages: usize,
    pub page_wait_ms: u64,
    pub detail_pause_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius: 5000,
            max_pages: 10,
            page_wait_ms: 2000,
            detail_pause_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub min_request_interval_ms: u64,
    pub cache_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            min_request_interval_ms: 3000,
            cache_capacity: 32,
        }
    }
}

impl AppSettings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Like [`AppSettings::from_file`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Settings file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// 替換環境變數 (例如 ${GOOGLE_MAPS_API_KEY})；未設定的保留原文
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("google.base_url", &self.google.base_url)?;
        validation::validate_range("google.timeout_seconds", self.google.timeout_seconds, 1, 300)?;
        validation::validate_radius("search.default_radius", self.search.default_radius)?;
        validation::validate_positive_number("search.max_pages", self.search.max_pages, 1)?;
        validation::validate_positive_number("server.cache_capacity", self.server.cache_capacity, 1)?;
        Ok(())
    }
}
