//! UF (Unidad de Fomento) lookup with multi-source fallback and caching

pub mod config;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use services::RateLookupService;
pub use types::{ConversionResult, RateInfo, RateResult, Result, UfError};
