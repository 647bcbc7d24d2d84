//! api.boostr.cl economy indicator

use super::{decode, parse_date, RateSource};
use crate::types::{RawRate, Result, UfError};

const BOOSTR_URL: &str = "https://api.boostr.cl/economy/indicator/uf.json";

pub struct BoostrSource {
    url: String,
}

impl BoostrSource {
    pub fn new() -> Self {
        Self::with_url(BOOSTR_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for BoostrSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for BoostrSource {
    fn name(&self) -> &str {
        "boostr.cl"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn parse(&self, body: &[u8]) -> Result<RawRate> {
        let res: api::Response = decode(body)?;
        if res.status != "success" {
            return Err(UfError::Parse(format!("status {:?}", res.status)));
        }
        let data = res
            .data
            .ok_or_else(|| UfError::Parse("missing data".into()))?;

        let date = data.date.as_deref().and_then(parse_date);
        Ok(RawRate::new(data.value.value()?, date))
    }
}

mod api {
    use crate::sources::NumberOrString;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub status: String,
        pub data: Option<Data>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Data {
        pub date: Option<String>,
        pub value: NumberOrString,
    }
}
