use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../config/config.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub list: ListConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout: u32,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CacheConfig {
    /// `"memory"` enables the in-process cache, anything else disables caching.
    pub r#type: String,
    pub max_size: u32,
    /// Entry time-to-live in seconds.
    pub expiration: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ListConfig {
    pub page_size: usize,
    /// How many entries to pull in one request when a search term switches a
    /// controller to client-side filtering.
    pub search_batch_size: usize,
    pub pokemon_batch_size: usize,
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_CONFIG)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw).map_err(|e| {
            tracing::error!("Failed to parse config: {}", e);
            ConfigError::from(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::parse(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.list.page_size == 0 {
            return Err(ConfigError::Invalid("list.page_size must be positive".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url cannot be empty".into()));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout))
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            r#type: "memory".to_string(),
            max_size: 1000,
            expiration: 3600, // 1 hour
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.expiration))
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            search_batch_size: 1000,
            pokemon_batch_size: 1302,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_config_parses() {
        let config = Config::bundled().unwrap();
        assert_eq!(config.api.base_url(), "https://pokeapi.co/api/v2");
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.api.initial_backoff(), Duration::from_secs(1));
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.list.page_size, 30);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let raw = DEFAULT_CONFIG.replace("page_size = 30", "page_size = 0");
        assert!(matches!(Config::parse(&raw), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            Config::parse("[api]\nbase_url = 12"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let raw = DEFAULT_CONFIG.replace("api/v2\"", "api/v2/\"");
        let config = Config::parse(&raw).unwrap();
        assert_eq!(config.api.base_url(), "https://pokeapi.co/api/v2");
    }
}
