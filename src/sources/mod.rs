//! UF rate sources
//!
//! Each source knows one endpoint and how to pull the UF out of its
//! response. The lookup service tries them in registry order.

pub mod boostr;
pub mod cmf;
pub mod mindicador;
pub mod santa;

pub use boostr::BoostrSource;
pub use cmf::CmfSource;
pub use mindicador::MindicadorSource;
pub use santa::SantaSource;

use crate::config::Config;
use crate::services::http::HttpClient;
use crate::services::normalizer::parse_amount;
use crate::types::{RawRate, Result, UfError};
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for UF rate sources
pub trait RateSource: Send + Sync {
    /// Label reported as the result's source
    fn name(&self) -> &str;

    fn url(&self) -> &str;

    /// Extract the raw value from a response body
    fn parse(&self, body: &[u8]) -> Result<RawRate>;

    /// GET the endpoint and parse it; non-2xx statuses are failures
    fn fetch(&self, client: &dyn HttpClient) -> Result<RawRate> {
        let response = client.get(self.url())?;
        if !response.is_success() {
            return Err(UfError::Status {
                status: response.status,
            });
        }
        self.parse(&response.body)
    }
}

/// Configurable source identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Santa,
    Mindicador,
    Boostr,
    Cmf,
}

impl SourceKind {
    /// Default priority order
    pub fn all() -> Vec<SourceKind> {
        vec![
            SourceKind::Santa,
            SourceKind::Mindicador,
            SourceKind::Boostr,
            SourceKind::Cmf,
        ]
    }
}

/// Ordered list of sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn RateSource>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Box<dyn RateSource>>) -> Self {
        Self { sources }
    }

    /// Build the sources enabled in config, in configured order
    pub fn from_config(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn RateSource>> = Vec::new();

        for kind in &config.sources {
            match kind {
                SourceKind::Santa => sources.push(Box::new(SantaSource::new())),
                SourceKind::Mindicador => sources.push(Box::new(MindicadorSource::new())),
                SourceKind::Boostr => sources.push(Box::new(BoostrSource::new())),
                SourceKind::Cmf => match config.cmf_api_key.as_deref() {
                    Some(key) if !key.trim().is_empty() => match CmfSource::new(key.trim()) {
                        Ok(source) => sources.push(Box::new(source)),
                        Err(e) => tracing::warn!(error = %e, "cmfchile.cl source disabled"),
                    },
                    _ => tracing::warn!("CMF API key not set; cmfchile.cl source disabled"),
                },
            }
        }

        Self { sources }
    }

    pub fn sources(&self) -> &[Box<dyn RateSource>] {
        &self.sources
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// JSON field that may carry a number or a formatted string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    pub(crate) fn value(&self) -> Result<f64> {
        match self {
            NumberOrString::Number(n) => Ok(*n),
            NumberOrString::String(s) => {
                parse_amount(s).ok_or_else(|| UfError::Parse(format!("not a number: {:?}", s)))
            }
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| UfError::Parse(format!("invalid JSON: {}", e)))
}

/// Accepts "2024-05-01", RFC 3339 timestamps and "01-05-2024"
pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(input, "%d-%m-%Y").ok()
}

#[cfg(test)]
pub(crate) fn read_fixture(name: &str) -> Vec<u8> {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}
