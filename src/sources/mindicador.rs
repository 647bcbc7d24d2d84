//! mindicador.cl UF series
//!
//! The series is ordered newest first; only the head is used.

use super::{decode, parse_date, RateSource};
use crate::types::{RawRate, Result, UfError};

const MINDICADOR_URL: &str = "https://mindicador.cl/api/uf";

pub struct MindicadorSource {
    url: String,
}

impl MindicadorSource {
    pub fn new() -> Self {
        Self::with_url(MINDICADOR_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for MindicadorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for MindicadorSource {
    fn name(&self) -> &str {
        "mindicador.cl"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn parse(&self, body: &[u8]) -> Result<RawRate> {
        let res: api::Response = decode(body)?;
        let latest = res
            .serie
            .first()
            .ok_or_else(|| UfError::Parse("empty serie".into()))?;

        Ok(RawRate::new(latest.valor.value()?, parse_date(&latest.fecha)))
    }
}

mod api {
    use crate::sources::NumberOrString;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub serie: Vec<Entry>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Entry {
        pub fecha: String,
        pub valor: NumberOrString,
    }
}
