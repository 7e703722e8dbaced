use crate::prelude::*;
use lunchmoney_core::request::{Endpoint, Method};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://dev.lunchmoney.app/v1";

/// Lunch Money configuration resolved from the global options
#[derive(Debug, Clone)]
pub struct LunchMoneyConfig {
    pub base_url: String,
    pub api_token: String,
}

impl LunchMoneyConfig {
    /// Read the base URL and token (flag or environment variable).
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let api_token = global
            .api_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or(Error::MissingConfig("LUNCHMONEY_API_TOKEN"))?;

        Ok(Self {
            base_url: global.base_url.clone(),
            api_token,
        })
    }
}

/// Create an HTTP client that sends the bearer token on every request
pub fn create_authenticated_client(config: &LunchMoneyConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|e| eyre!("Invalid header value: {}", e))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Result of one upstream call.
///
/// A non-success status is not an error for the caller: tools report it as
/// text, so it travels as `Failure(status_text)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(status) => Outcome::Failure(status),
        }
    }

    /// Turn a failure into an error carrying the tool's failure message.
    pub fn into_result(self, prefix: &str) -> Result<T> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(status) => Err(Error::Upstream(
                lunchmoney_core::upstream::failure_message(prefix, &status),
            )
            .into()),
        }
    }
}

/// Human readable text for a status, e.g. `Not Found`.
pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

#[derive(Debug, Clone)]
pub struct LunchMoneyClient {
    config: LunchMoneyConfig,
    http: reqwest::Client,
}

impl LunchMoneyClient {
    pub fn new(config: LunchMoneyConfig) -> Result<Self> {
        let http = create_authenticated_client(&config)?;
        Ok(Self { config, http })
    }

    pub fn from_global(global: &crate::Global) -> Result<Self> {
        Self::new(LunchMoneyConfig::from_global(global)?)
    }

    /// Issue the request and return the raw body of a successful response.
    pub async fn execute(&self, endpoint: &Endpoint) -> Result<Outcome<String>> {
        let url = endpoint.url(&self.config.base_url);
        let method = match endpoint.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        log::debug!("{} {} query={:?}", endpoint.method, url, endpoint.query.pairs());

        let mut request = self.http.request(method, &url);
        if !endpoint.query.is_empty() {
            request = request.query(endpoint.query.pairs());
        }
        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} {} returned {}", endpoint.method, endpoint.path, status);
            return Ok(Outcome::Failure(status_text(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Outcome::Success(body))
    }

    /// Like [`execute`](Self::execute), parsing the body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<Outcome<T>> {
        match self.execute(endpoint).await? {
            Outcome::Success(body) => {
                let parsed = serde_json::from_str(&body)
                    .map_err(|e| Error::InvalidResponse(f!("{} {}: {e}", endpoint.method, endpoint.path)))?;
                Ok(Outcome::Success(parsed))
            }
            Outcome::Failure(status) => Ok(Outcome::Failure(status)),
        }
    }
}
