//! Log events emitted by the lookup service
//!
//! Every failure point of a lookup reports through here so the event
//! names and fields stay consistent.

use crate::types::UfError;
use tracing::{debug, error, info, warn};

pub fn cache_hit(source: &str) {
    debug!(source, "UF served from cache");
}

pub fn source_succeeded(source: &str, value: f64) {
    info!(source, value, "UF fetched");
}

pub fn source_failed(source: &str, err: &UfError) {
    let kind = match err {
        UfError::Transport(_) => "transport",
        UfError::Status { .. } => "status",
        UfError::Parse(_) => "parse",
        UfError::Validation { .. } => "validation",
        _ => "other",
    };
    warn!(source, kind, error = %err, "UF source failed, trying next");
}

pub fn sources_exhausted(err: &UfError, fallback: Option<f64>) {
    match fallback {
        Some(value) => error!(error = %err, fallback = value, "using static UF fallback"),
        None => error!(error = %err, "no UF value available"),
    }
}

pub fn cache_write_failed(err: &UfError) {
    warn!(error = %err, "failed to cache UF value");
}

pub fn cache_unavailable(err: &UfError) {
    warn!(error = %err, "cache directory unusable, using in-memory cache");
}
