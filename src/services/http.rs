//! Blocking HTTP GET used by rate sources

use crate::types::{Result, UfError};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Raw response handed to a source for parsing
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpClient: Send + Sync {
    /// GET `url`. Transport failures are errors; any HTTP status is a response.
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// reqwest-backed client with a fixed per-request timeout
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::from_builder(client_builder(timeout))
    }

    fn from_builder(builder: ClientBuilder) -> Result<Self> {
        let client = builder
            .build()
            .map_err(|e| UfError::Transport(format!("Client build failed: {}", e)))?;
        Ok(Self { client })
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-CL,es;q=0.9,en;q=0.8"));
    headers
}

fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(default_headers())
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| UfError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| UfError::Transport(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
