//! Authenticated REST client for a Pod instance.
//!
//! The client owns the connection options and a transport carrying the
//! platform's two fixed headers. Every call classifies its response into
//! one of three outcomes: a paginated envelope, a single passthrough
//! payload, or "unavailable", which deliberately folds together HTTP 404,
//! empty or undecodable bodies, and transport failures. Callers cannot
//! tell those cases apart from the outcome alone.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::PodConfig;

/// Failures while assembling the underlying HTTP client.
///
/// Logged at construction and never surfaced: the client instance stays
/// usable but classifies every request as [`ApiResponse::Unavailable`].
#[derive(Debug, Error)]
enum ClientBuildError {
    #[error("API key is not a valid header value: {0}")]
    ApiKey(#[from] InvalidHeaderValue),

    #[error("HTTP client construction failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One classified outcome of a REST call.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    /// HTTP 404, an empty or undecodable body, or a transport failure.
    Unavailable,
    /// A paginated envelope carrying a `results` sequence.
    Page(PageResult),
    /// Any other non-empty payload, passed through untouched.
    Single(Value),
}

impl ApiResponse {
    /// Returns true when the call produced no usable data.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Normalized pagination wrapper built from a `results` envelope.
///
/// Built fresh per call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Requested page number, read from the `page` query parameter.
    pub page: u64,
    /// Raw records in envelope order.
    pub results: Vec<Value>,
    /// Page count derived from the envelope's item count.
    pub pages: u64,
    /// Total item count reported by the platform.
    pub total: u64,
}

/// REST client for one Pod instance.
///
/// Requests carry `Authorization: Token <key>` and
/// `Content-Type: application/json` on every call.
pub struct ApiClient {
    config: PodConfig,
    client: Option<Client>,
}

impl ApiClient {
    /// Creates a client for the configured instance.
    ///
    /// Construction never fails the caller: if the transport cannot be
    /// assembled (for instance an API key that is not a valid header
    /// value), the failure is logged and every later request reports the
    /// platform as unavailable.
    #[must_use]
    pub fn new(config: PodConfig) -> Self {
        let client = match build_http_client(&config) {
            Ok(client) => Some(client),
            Err(error) => {
                warn!(
                    error = %error,
                    "Pod REST client unusable; requests will report the platform as unreachable"
                );
                None
            }
        };
        Self { config, client }
    }

    /// Returns the connection options this client was built with.
    #[must_use]
    pub fn config(&self) -> &PodConfig {
        &self.config
    }

    /// Issues one GET against `path` with `params` as the query string and
    /// classifies the response.
    ///
    /// No retries, and no timeout beyond the transport's own defaults;
    /// every failure mode folds into [`ApiResponse::Unavailable`].
    #[tracing::instrument(skip(self, params), fields(path = %path))]
    pub async fn execute_request(&self, path: &str, params: &[(&str, &str)]) -> ApiResponse {
        let Some(client) = &self.client else {
            warn!("request dropped: client construction failed earlier");
            return ApiResponse::Unavailable;
        };

        let raw_url = format!("{}{}", self.config.api_url(), path);
        let Ok(url) = Url::parse(&raw_url) else {
            warn!(url = %raw_url, "request dropped: not a valid URL");
            return ApiResponse::Unavailable;
        };

        let response = match client.get(url).query(params).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "Pod request failed");
                return ApiResponse::Unavailable;
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return ApiResponse::Unavailable;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                warn!(error = %error, "Pod response body could not be read");
                return ApiResponse::Unavailable;
            }
        };

        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(error) => {
                debug!(error = %error, "Pod response was not valid JSON");
                return ApiResponse::Unavailable;
            }
        };

        self.classify(data, params)
    }

    /// Classifies a decoded payload: empty data is unavailable, a `results`
    /// envelope becomes a [`PageResult`], anything else passes through.
    fn classify(&self, data: Value, params: &[(&str, &str)]) -> ApiResponse {
        if is_empty_payload(&data) {
            return ApiResponse::Unavailable;
        }
        match data {
            Value::Object(mut envelope) if envelope.contains_key("results") => {
                let results = match envelope.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        debug!("envelope `results` field is not a sequence");
                        Vec::new()
                    }
                };
                let total = envelope.get("count").and_then(Value::as_u64).unwrap_or(0);
                let page_size = u64::from(self.config.page_size().max(1));
                ApiResponse::Page(PageResult {
                    page: requested_page(params),
                    results,
                    pages: total.div_ceil(page_size),
                    total,
                })
            }
            other => ApiResponse::Single(other),
        }
    }
}

/// Reads the requested page number from the query parameters, defaulting
/// to the first page.
fn requested_page(params: &[(&str, &str)]) -> u64 {
    params
        .iter()
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1)
}

/// Returns true when a decoded body carries no data: null, false, zero, an
/// empty or `"0"` string, or an empty collection.
fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value == 0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn build_http_client(config: &PodConfig) -> Result<Client, ClientBuildError> {
    let mut token = HeaderValue::from_str(&format!("Token {}", config.api_key()))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, token);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(Client::builder().default_headers(headers).build()?)
}
