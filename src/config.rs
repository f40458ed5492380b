// Warm-up configuration.
// Cache key namespace, per-fetch timeout, preload modules, and group key precedence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::ModuleRef;
use crate::error::{Result, WarmupError};

/// Default namespace prefixed to every cache key.
pub const DEFAULT_NAMESPACE: &str = "warmup";

/// Default per-fetch timeout: 10 seconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Default group identifier keys, highest precedence first.
/// Dotted entries are looked up one level deep.
pub const DEFAULT_GROUP_KEYS: [&str; 6] = [
    "id_group", "id_grupo", "groupId", "group_id", "idGroup", "group.id",
];

const ENV_NAMESPACE: &str = "WARMCACHE_NAMESPACE";
const ENV_FETCH_TIMEOUT_MS: &str = "WARMCACHE_FETCH_TIMEOUT_MS";

/// Policy knobs for warm-up runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// Prefix for cache keys.
    pub key_namespace: String,
    /// Timeout applied to each store call; `None` waits indefinitely.
    pub fetch_timeout_ms: Option<u64>,
    /// Consumer modules handed to the preloader on every warm-up.
    pub preload_modules: Vec<ModuleRef>,
    /// Field configuration keys naming a dependency, highest precedence first.
    pub group_keys: Vec<String>,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            key_namespace: DEFAULT_NAMESPACE.to_string(),
            fetch_timeout_ms: Some(DEFAULT_FETCH_TIMEOUT_MS),
            preload_modules: Vec::new(),
            group_keys: DEFAULT_GROUP_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl WarmupConfig {
    /// Load defaults overridden by `WARMCACHE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON config document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            config.key_namespace = namespace;
        }

        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                WarmupError::Other(format!("Invalid {}: {:?}", ENV_FETCH_TIMEOUT_MS, raw))
            })?;
            // Zero disables the timeout
            config.fetch_timeout_ms = (millis > 0).then_some(millis);
        }

        Ok(config)
    }

    /// Per-fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.key_namespace = namespace.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn with_preload_modules(mut self, modules: Vec<ModuleRef>) -> Self {
        self.preload_modules = modules;
        self
    }

    pub fn with_group_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}
