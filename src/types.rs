//! Core data types for UF lookups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source label used when every configured source failed
pub const FALLBACK_SOURCE: &str = "internal fallback";

/// Errors raised while looking up or converting the UF
#[derive(Debug, Error)]
pub enum UfError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("value {value} outside accepted range [{min}, {max}]")]
    Validation { value: f64, min: f64, max: f64 },

    #[error("all {attempted} sources failed")]
    AllSourcesExhausted { attempted: usize },

    #[error("UF value is not available")]
    RateUnavailable,

    #[error("invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UfError>;

/// Value extracted by a source before validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRate {
    pub value: f64,
    /// Publication date reported by the source, if any
    pub date: Option<NaiveDate>,
}

impl RawRate {
    pub fn new(value: f64, date: Option<NaiveDate>) -> Self {
        Self { value, date }
    }
}

/// Outcome of a UF lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub success: bool,
    /// es-CL formatted value, e.g. "39.224,63"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub date: NaiveDate,
    pub source: String,
    #[serde(default)]
    pub simulated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RateResult {
    /// Result obtained from a live source
    pub fn live(value: String, date: NaiveDate, source: impl Into<String>) -> Self {
        Self {
            success: true,
            value: Some(value),
            date,
            source: source.into(),
            simulated: false,
            error: None,
        }
    }

    /// Static fallback result, flagged as simulated
    pub fn simulated(value: String, date: NaiveDate, error: String) -> Self {
        Self {
            success: true,
            value: Some(value),
            date,
            source: FALLBACK_SOURCE.to_string(),
            simulated: true,
            error: Some(error),
        }
    }

    /// No value at all (fallback disabled)
    pub fn unavailable(date: NaiveDate, error: String) -> Self {
        Self {
            success: false,
            value: None,
            date,
            source: FALLBACK_SOURCE.to_string(),
            simulated: false,
            error: Some(error),
        }
    }
}

/// CLP amount converted to UF
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub amount_formatted: String,
    pub amount_uf: f64,
    pub amount_uf_formatted: String,
    pub uf_value: f64,
    pub date: NaiveDate,
    pub source: String,
    pub simulated: bool,
}

/// Complete view of the current UF for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateInfo {
    pub value: Option<f64>,
    pub formatted_value: String,
    pub date: NaiveDate,
    pub source: String,
    pub is_simulated: bool,
    pub success: bool,
    pub error: Option<String>,
}
