use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use aid_types::api::ErrorBody;

use crate::error::ClientError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Thin typed wrapper over the backend's REST API.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    pub(crate) fn patch(&self, path: &str) -> RequestBuilder {
        self.http
            .patch(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http
            .delete(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }
}

/// Turn a non-2xx response into `ClientError::Status`, keeping the server's
/// own message when it sent one.
pub(crate) async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text.chars().take(200).collect()
            }
        });

    debug!("{} -> {}: {}", url, status, message);
    Err(ClientError::Status { status, message })
}

/// Decode a JSON body. Decoding goes through serde_json directly so a body
/// with missing or mistyped fields surfaces as `ClientError::Decode`.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
