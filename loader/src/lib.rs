pub mod controller;
pub mod error;
pub mod source;
pub mod state;
pub mod telemetry;

use payloads::ProductPage;
use std::path::PathBuf;
use std::time::Duration;

pub use controller::{
    FallbackPolicy, LoaderOptions, ResourceLoader, StateWatcher,
};
pub use error::{LoadError, TransportError};
pub use source::{DataSource, RawResponse};
pub use state::{LoadState, Loaded, RequestId, Snapshot};

pub const DEFAULT_SOURCE_ADDRESS: &str = "https://dummyjson.com";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base address of the product source; the collection is served from
    /// `{source_address}/products`.
    pub source_address: String,
    pub request_timeout: Option<Duration>,
    /// When set, the console consumer re-triggers on this interval.
    pub refresh_interval: Option<Duration>,
    /// JSON product page published as degraded data when the source is
    /// unreachable.
    pub fallback_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value lookup. Empty values count as
    /// unset.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Config {
            source_address: var("SOURCE_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SOURCE_ADDRESS.to_string()),
            request_timeout: var("REQUEST_TIMEOUT_MS")
                .map(|v| positive("REQUEST_TIMEOUT_MS", v))
                .transpose()?
                .map(Duration::from_millis),
            refresh_interval: var("REFRESH_INTERVAL_SECS")
                .map(|v| positive("REFRESH_INTERVAL_SECS", v))
                .transpose()?
                .map(Duration::from_secs),
            fallback_file: var("FALLBACK_FILE").map(PathBuf::from),
        })
    }

    /// Loader options for this config, reading the fallback page from disk
    /// if one is configured.
    pub fn loader_options(&self) -> Result<LoaderOptions, ConfigError> {
        let fallback = match &self.fallback_file {
            None => FallbackPolicy::Disabled,
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::FallbackRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                let page: ProductPage = serde_json::from_str(&contents)
                    .map_err(|source| ConfigError::FallbackParse {
                        path: path.clone(),
                        source,
                    })?;
                FallbackPolicy::Substitute(page)
            }
        };
        Ok(LoaderOptions {
            timeout: self.request_timeout,
            fallback,
        })
    }
}

fn positive(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("Failed to read fallback file {}", .path.display())]
    FallbackRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Fallback file {} is not a valid product page", .path.display())]
    FallbackParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
