//! UF lookup with multi-source fallback and caching
//!
//! Lookup order:
//! 1. Live cache entry, no network
//! 2. Each source in registry order; the first valid value wins and is cached
//! 3. Static fallback, flagged `simulated` and never cached

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::cache::{FileCache, MemoryCache, RateCache, CACHE_KEY};
use crate::services::clock::{Clock, SystemClock};
use crate::services::http::{HttpClient, ReqwestClient};
use crate::services::normalizer::{format_amount, format_currency, parse_amount, round_to};
use crate::services::report;
use crate::sources::{RateSource, SourceRegistry};
use crate::types::{ConversionResult, RateInfo, RateResult, Result, UfError};

/// Lookup policy derived from [`Config`]
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub ttl: Duration,
    pub fallback_value: Option<f64>,
    pub range: RangeInclusive<f64>,
}

impl LookupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: config.cache_ttl(),
            fallback_value: config.fallback_value,
            range: config.min_value..=config.max_value,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct RateLookupService {
    client: Arc<dyn HttpClient>,
    cache: Arc<dyn RateCache>,
    registry: SourceRegistry,
    clock: Arc<dyn Clock>,
    settings: LookupSettings,
}

impl RateLookupService {
    pub fn new(
        client: Arc<dyn HttpClient>,
        cache: Arc<dyn RateCache>,
        registry: SourceRegistry,
        clock: Arc<dyn Clock>,
        settings: LookupSettings,
    ) -> Self {
        Self {
            client,
            cache,
            registry,
            clock,
            settings,
        }
    }

    /// Production wiring: reqwest client, file cache, configured sources.
    /// Falls back to an in-process cache when the cache dir is unusable.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_cache(config, cache_or_memory(FileCache::new()))
    }

    /// Same as [`from_config`](Self::from_config) with an in-process cache only
    pub fn from_config_uncached(config: &Config) -> Result<Self> {
        Self::from_config_with_cache(config, Arc::new(MemoryCache::new()))
    }

    fn from_config_with_cache(config: &Config, cache: Arc<dyn RateCache>) -> Result<Self> {
        let client = ReqwestClient::new(config.timeout())?;
        Ok(Self::new(
            Arc::new(client),
            cache,
            SourceRegistry::from_config(config),
            Arc::new(SystemClock),
            LookupSettings::from_config(config),
        ))
    }

    /// Current UF. Never fails: source errors degrade to the next source
    /// and finally to the static fallback.
    pub fn get_value(&self) -> RateResult {
        if let Some(cached) = self.cache.get(CACHE_KEY) {
            report::cache_hit(&cached.source);
            return cached;
        }

        let mut failures = Vec::with_capacity(self.registry.len());
        for source in self.registry.sources() {
            match self.try_source(source.as_ref()) {
                Ok(result) => {
                    if let Err(e) = self.cache.set(CACHE_KEY, &result, self.settings.ttl) {
                        report::cache_write_failed(&e);
                    }
                    return result;
                }
                Err(e) => {
                    report::source_failed(source.name(), &e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        self.fallback(failures)
    }

    /// Drop the cached value and look up again
    pub fn refresh(&self) -> RateResult {
        if let Err(e) = self.cache.forget(CACHE_KEY) {
            report::cache_write_failed(&e);
        }
        self.get_value()
    }

    /// Remove the cached value
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.forget(CACHE_KEY)
    }

    /// Display string, e.g. "$39.224,63" or "$39.224,63 (simulated)"
    pub fn get_formatted(&self) -> String {
        format_result(&self.get_value())
    }

    /// Convert a CLP amount to UF using the current value
    pub fn convert_amount(&self, amount: f64) -> Result<ConversionResult> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(UfError::InvalidAmount(amount));
        }

        let result = self.get_value();
        if !result.success {
            return Err(UfError::RateUnavailable);
        }
        let uf_value = result
            .value
            .as_deref()
            .and_then(parse_amount)
            .filter(|v| *v > 0.0)
            .ok_or(UfError::RateUnavailable)?;

        let amount_uf = round_to(amount / uf_value, 2);

        Ok(ConversionResult {
            amount,
            amount_formatted: format_amount(amount, 2),
            amount_uf,
            amount_uf_formatted: format_amount(amount_uf, 2),
            uf_value,
            date: result.date,
            source: result.source,
            simulated: result.simulated,
        })
    }

    /// Everything known about the current UF in one struct
    pub fn info(&self) -> RateInfo {
        let result = self.get_value();
        RateInfo {
            value: result.value.as_deref().and_then(parse_amount),
            formatted_value: format_result(&result),
            date: result.date,
            source: result.source,
            is_simulated: result.simulated,
            success: result.success,
            error: result.error,
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    fn try_source(&self, source: &dyn RateSource) -> Result<RateResult> {
        let raw = source.fetch(self.client.as_ref())?;
        let value = self.validate(raw.value)?;
        report::source_succeeded(source.name(), value);

        let date = raw.date.unwrap_or_else(|| self.clock.today());
        Ok(RateResult::live(format_amount(value, 2), date, source.name()))
    }

    fn validate(&self, value: f64) -> Result<f64> {
        if value.is_finite() && self.settings.range.contains(&value) {
            Ok(value)
        } else {
            Err(UfError::Validation {
                value,
                min: *self.settings.range.start(),
                max: *self.settings.range.end(),
            })
        }
    }

    fn fallback(&self, failures: Vec<String>) -> RateResult {
        let exhausted = UfError::AllSourcesExhausted {
            attempted: failures.len(),
        };
        report::sources_exhausted(&exhausted, self.settings.fallback_value);

        let message = if failures.is_empty() {
            format!("{} (no sources configured)", exhausted)
        } else {
            format!("{}: {}", exhausted, failures.join("; "))
        };
        let today = self.clock.today();

        match self.settings.fallback_value {
            Some(value) => RateResult::simulated(format_amount(value, 2), today, message),
            None => RateResult::unavailable(today, message),
        }
    }
}

/// Use the file cache when it opened, an in-process cache otherwise
fn cache_or_memory(file_cache: Result<FileCache>) -> Arc<dyn RateCache> {
    match file_cache {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            report::cache_unavailable(&e);
            Arc::new(MemoryCache::new())
        }
    }
}

/// Render a lookup result for display
pub fn format_result(result: &RateResult) -> String {
    let value = match result.value.as_deref().and_then(parse_amount) {
        Some(v) => v,
        None => return "unavailable".to_string(),
    };

    if result.simulated {
        format!("{} (simulated)", format_currency(value))
    } else if result.success {
        format_currency(value)
    } else {
        "unavailable".to_string()
    }
}
