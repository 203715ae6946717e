use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "config/screener.toml";

/// Top-level screener config file (TOML).
///
/// Example `config/screener.toml`:
/// ```toml
/// [data_source]
/// provider = "tencent"
///
/// [defaults]
/// max_workers = 8
/// retry_count = 3
///
/// [strategies.BreakM100]
/// enabled = true
///
/// [strategies.ContinuousRiseStrategy]
/// enabled = true
/// params = { threshold = 9.0, volume_multiple = 2.0 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenerConfig {
    pub data_source: DataSourceConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Keyed by strategy identifier, e.g. "BreakM100".
    #[serde(default)]
    pub strategies: BTreeMap<String, StrategySettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSourceConfig {
    /// "tencent" or "eastmoney".
    pub provider: String,
    /// Per-request timeout. A timeout is reported as a transient network error.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    /// Upper bound on concurrently running fetch jobs.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Retries per symbol after the first failed attempt.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Trading days fetched when the caller gives no explicit window.
    #[serde(default = "default_check_days")]
    pub check_days: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            retry_count: default_retry_count(),
            check_days: default_check_days(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategySettings {
    #[serde(default)]
    pub enabled: bool,
    /// Strategy-specific numeric parameters.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_workers() -> usize {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_check_days() -> usize {
    120
}

/// Upstream market-data source selected by `data_source.provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Tencent,
    EastMoney,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tencent" => Ok(ProviderKind::Tencent),
            "eastmoney" | "dongfangcaifu" => Ok(ProviderKind::EastMoney),
            other => Err(Error::Config(format!(
                "data_source.provider must be 'tencent' or 'eastmoney', got: '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Tencent => write!(f, "tencent"),
            ProviderKind::EastMoney => write!(f, "eastmoney"),
        }
    }
}

impl ScreenerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: ScreenerConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file. An unreadable file is `Error::Io`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `.env` if present, then the file named by `SCREENER_CONFIG_PATH`.
    /// `SCREENER_PROVIDER` overrides `data_source.provider`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let path = optional_env("SCREENER_CONFIG_PATH")
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load(&path)?;

        if let Some(provider) = optional_env("SCREENER_PROVIDER") {
            info!(%provider, "Provider overridden from environment");
            cfg.data_source.provider = provider;
            cfg.validate()?;
        }
        Ok(cfg)
    }

    pub fn provider_kind(&self) -> Result<ProviderKind> {
        self.data_source.provider.parse()
    }

    /// Keys of all enabled strategies, sorted.
    pub fn enabled_strategies(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn validate(&self) -> Result<()> {
        self.provider_kind()?;
        if self.defaults.max_workers == 0 {
            return Err(Error::Config("defaults.max_workers must be positive".into()));
        }
        if self.defaults.check_days == 0 {
            return Err(Error::Config("defaults.check_days must be positive".into()));
        }
        if self.data_source.timeout_ms == 0 {
            return Err(Error::Config("data_source.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
