//! CMF Chile (api-sbifv3) UF resource
//!
//! Requires an API key. Values come as es-CL strings ("39.224,63").

use super::{decode, parse_date, RateSource};
use crate::services::normalizer::parse_amount;
use crate::types::{RawRate, Result, UfError};
use reqwest::Url;

const CMF_BASE_URL: &str = "https://api.cmfchile.cl/api-sbifv3/recursos_api/uf";

pub struct CmfSource {
    url: String,
}

impl CmfSource {
    pub fn new(api_key: &str) -> Result<Self> {
        let url = Url::parse_with_params(CMF_BASE_URL, &[("apikey", api_key), ("formato", "json")])
            .map_err(|e| UfError::Config(format!("invalid CMF URL: {}", e)))?;
        Ok(Self::with_url(url.as_str()))
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RateSource for CmfSource {
    fn name(&self) -> &str {
        "cmfchile.cl"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn parse(&self, body: &[u8]) -> Result<RawRate> {
        let res: api::Response = decode(body)?;
        let entry = res
            .ufs
            .first()
            .ok_or_else(|| UfError::Parse("empty UFs".into()))?;

        let value = parse_amount(&entry.valor)
            .ok_or_else(|| UfError::Parse(format!("not a number: {:?}", entry.valor)))?;
        Ok(RawRate::new(value, parse_date(&entry.fecha)))
    }
}

mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        #[serde(rename = "UFs")]
        pub ufs: Vec<Entry>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct Entry {
        pub valor: String,
        pub fecha: String,
    }
}
