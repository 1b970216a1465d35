use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_WORKER_TIMEOUT_SECS, MAX_SEARCH_STATES};
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Deserialize, Debug)]
pub struct RebaseConfigRoot {
    pub rebase: RebaseConfig,
}

/// Settings of the rebasing engine, read from the `[rebase]` section.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RebaseConfig {
    /// Depth used when a caller does not ask for one
    pub max_depth: u8,
    /// Upper bound for a single pair computation
    pub worker_timeout_secs: u64,
    /// Pair computations running at the same time
    pub max_concurrency: usize,
    /// Lifetime of cached results, `None` keeps them until invalidated
    pub cache_ttl_secs: Option<u64>,
    /// Path search states a single pair may expand before its rebase fails
    pub max_search_states: usize,
}

impl Default for RebaseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            worker_timeout_secs: DEFAULT_WORKER_TIMEOUT_SECS,
            max_concurrency: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            cache_ttl_secs: None,
            max_search_states: MAX_SEARCH_STATES,
        }
    }
}

impl RebaseConfig {
    pub fn with_max_depth(&self, max_depth: u8) -> Self {
        Self { max_depth, ..self.clone() }
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, LoadConfigError> {
        let mut config = Self::default();

        if let Some(max_depth) = parse_env("REBASE_MAX_DEPTH")? {
            config.max_depth = max_depth;
        }
        if let Some(timeout) = parse_env("REBASE_WORKER_TIMEOUT_SECS")? {
            config.worker_timeout_secs = timeout;
        }
        if let Some(max_concurrency) = parse_env("REBASE_MAX_CONCURRENCY")? {
            config.max_concurrency = max_concurrency;
        }
        if let Some(ttl) = parse_env("REBASE_CACHE_TTL_SECS")? {
            config.cache_ttl_secs = Some(ttl);
        }
        if let Some(max_search_states) = parse_env("REBASE_MAX_SEARCH_STATES")? {
            config.max_search_states = max_search_states;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.max_depth == 0 {
            return Err(LoadConfigError::ConfigError("max_depth must be at least 1".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(LoadConfigError::ConfigError("max_concurrency must be at least 1".to_string()));
        }
        if self.max_search_states == 0 {
            return Err(LoadConfigError::ConfigError("max_search_states must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, LoadConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.parse().map(Some).map_err(|e| LoadConfigError::ConfigError(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[async_trait]
impl ConfigLoader for RebaseConfig {
    type SectionType = RebaseConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RebaseConfigRoot = load_from_file(file_name).await?;
        root.rebase.validate()?;
        Ok(root.rebase)
    }
}

impl ConfigLoaderSync for RebaseConfig {
    type SectionType = RebaseConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RebaseConfigRoot = load_from_file_sync(file_name)?;
        root.rebase.validate()?;
        Ok(root.rebase)
    }
}
