//! Shared plumbing for the hosted backend's REST APIs (auth under `/auth/v1`,
//! data under `/rest/v1`).

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Project URL + public (anon) key, plus an HTTP client bounded by `timeout`.
#[derive(Clone)]
pub struct BackendEndpoint {
    base_url: Url,
    anon_key: String,
    client: Client,
}

impl BackendEndpoint {
    pub fn new(base_url: &Url, anon_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        // `Url::join` replaces the last path segment unless the base ends with '/'.
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            anon_key: anon_key.to_string(),
            client,
        })
    }

    /// `path` is relative to the project URL, e.g. `auth/v1/user`.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.with_key(self.client.get(url))
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.with_key(self.client.post(url))
    }

    fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }
}

/// Pull a human-readable message out of an error body.
///
/// The auth API has used `msg`, `message`, `error_description` and `error`
/// across versions; the data API uses `message`.
pub fn error_message(body: &Value) -> String {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| "unknown error".to_string())
}
