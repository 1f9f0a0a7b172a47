//! Client configuration: which backend to talk to and how aggressively to cache.
//!
//! Resolution order: built-in defaults, then the TOML file at
//! `<config dir>/inventory/config.toml` (if present), then environment
//! variables (a `.env` file is loaded first).

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEV_BASE_URL: &str = "http://localhost:3030";
pub const PROD_BASE_URL: &str = "http://192.168.1.66:3030";

const ENV_ENVIRONMENT: &str = "INVENTORY_ENV";
const ENV_API_URL: &str = "INVENTORY_API_URL";
const ENV_REFETCH_SECS: &str = "INVENTORY_REFETCH_SECS";
const ENV_REQUEST_TIMEOUT_SECS: &str = "INVENTORY_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    #[strum(to_string = "development", serialize = "dev")]
    Development,
    #[strum(to_string = "production", serialize = "prod")]
    Production,
}

impl Environment {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Development => DEV_BASE_URL,
            Environment::Production => PROD_BASE_URL,
        }
    }
}

/// Read-cache policy. The defaults poll primary collections once a minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub refetch_interval_secs: u64,
    pub stale_time_secs: u64,
    pub retry: usize,
    /// Unused entries are evicted after this long without a read.
    pub gc_time_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refetch_interval_secs: 60,
            stale_time_secs: 0,
            retry: 2,
            gc_time_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    pub fn refetch_interval(&self) -> Duration {
        Duration::from_secs(self.refetch_interval_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

/// Profile served by the in-process shell when no native sign-in is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    /// Validated, without any guarantee about a trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub cache: CacheConfig,
    pub profile: Option<ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            environment,
            base_url: environment.default_base_url().to_string(),
            request_timeout: Duration::from_secs(30),
            search_debounce: Duration::from_millis(300),
            cache: CacheConfig::default(),
            profile: None,
        }
    }
}

/// On-disk shape; every field is optional so partial files work.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    environment: Option<Environment>,
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
    cache: Option<CacheConfig>,
    profile: Option<ProfileConfig>,
}

impl Config {
    /// Load `.env`, the user config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let path = default_config_path().filter(|p| p.exists());
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn load_from(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };

        let environment = match env(ENV_ENVIRONMENT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_ENVIRONMENT,
                value: raw,
            })?,
            None => file.environment.unwrap_or_default(),
        };

        let base_url = match env(ENV_API_URL).or(file.api_url) {
            Some(raw) => Url::parse(raw.trim())?.to_string(),
            None => environment.default_base_url().to_string(),
        };

        let mut cache = file.cache.unwrap_or_default();
        if let Some(raw) = env(ENV_REFETCH_SECS) {
            cache.refetch_interval_secs = parse_secs(ENV_REFETCH_SECS, raw)?;
        }

        let request_timeout = match env(ENV_REQUEST_TIMEOUT_SECS) {
            Some(raw) => parse_secs(ENV_REQUEST_TIMEOUT_SECS, raw)?,
            None => file.request_timeout_secs.unwrap_or(30),
        };

        let config = Self {
            environment,
            base_url,
            request_timeout: Duration::from_secs(request_timeout),
            search_debounce: Duration::from_millis(file.search_debounce_ms.unwrap_or(300)),
            cache,
            profile: file.profile,
        };
        debug!(
            environment = %config.environment,
            base_url = %config.base_url,
            "Resolved inventory configuration"
        );
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("inventory").join("config.toml"))
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_secs(key: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}
