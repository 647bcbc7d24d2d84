//! Runtime configuration (~/.ufrate/config.json)

use crate::sources::SourceKind;
use crate::types::{Result, UfError};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Last known UF used when every source fails
pub const DEFAULT_FALLBACK_VALUE: f64 = 39224.63;

/// Longest accepted cache TTL (30 days)
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// `null` disables the static fallback
    pub fallback_value: Option<f64>,
    /// Accepted range; values outside are treated as a source failure
    pub min_value: f64,
    pub max_value: f64,
    /// Sources in priority order
    pub sources: Vec<SourceKind>,
    pub cmf_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            cache_ttl_secs: 3600,
            fallback_value: Some(DEFAULT_FALLBACK_VALUE),
            min_value: 30000.0,
            max_value: 50000.0,
            sources: SourceKind::all(),
            cmf_api_key: None,
        }
    }
}

impl Config {
    /// Default config path (~/.ufrate/config.json)
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.home_dir().join(".ufrate").join("config.json"))
    }

    /// Load from `path` (or the default path), then apply env overrides.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| UfError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overrides: UFRATE_CMF_API_KEY, UFRATE_TIMEOUT_SECS
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var("UFRATE_CMF_API_KEY") {
            self.cmf_api_key = Some(key);
        }
        if let Some(timeout) = var("UFRATE_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                UfError::Config(format!("UFRATE_TIMEOUT_SECS is not a number: {:?}", timeout))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(UfError::Config("timeout_secs must be positive".into()));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(UfError::Config(format!(
                "cache_ttl_secs {} exceeds {}",
                self.cache_ttl_secs, MAX_CACHE_TTL_SECS
            )));
        }
        if let Some(value) = self.fallback_value {
            if !value.is_finite() || value <= 0.0 {
                return Err(UfError::Config(format!(
                    "fallback_value must be a positive number, got {}",
                    value
                )));
            }
        }
        if self.min_value.is_nan() || self.max_value.is_nan() || self.min_value > self.max_value {
            return Err(UfError::Config(format!(
                "min_value {} exceeds max_value {}",
                self.min_value, self.max_value
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
