//! api.santa.cl UF endpoint
//!
//! Serves two shapes: the current `{"success": true, "data": {"uf", "date"}}`
//! and the older flat `{"uf", "today"}`.

use super::{decode, parse_date, RateSource};
use crate::types::{RawRate, Result, UfError};

const SANTA_URL: &str = "https://api.santa.cl/uf";

pub struct SantaSource {
    url: String,
}

impl SantaSource {
    pub fn new() -> Self {
        Self::with_url(SANTA_URL)
    }

    /// Point at a different endpoint (for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for SantaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for SantaSource {
    fn name(&self) -> &str {
        "santa.cl"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn parse(&self, body: &[u8]) -> Result<RawRate> {
        let res: api::Response = decode(body)?;

        if res.success == Some(true) {
            if let Some(api::Data { uf: Some(uf), date }) = res.data {
                let date = date.as_deref().and_then(parse_date);
                return Ok(RawRate::new(uf.value()?, date));
            }
        }

        if let (Some(uf), Some(today)) = (res.uf, res.today) {
            return Ok(RawRate::new(uf.value()?, parse_date(&today)));
        }

        Err(UfError::Parse("expected data.uf or uf/today fields".into()))
    }
}

mod api {
    use crate::sources::NumberOrString;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub success: Option<bool>,
        pub data: Option<Data>,
        pub uf: Option<NumberOrString>,
        pub today: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Data {
        pub uf: Option<NumberOrString>,
        pub date: Option<String>,
    }
}
