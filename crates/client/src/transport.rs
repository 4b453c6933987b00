//! HTTP transport
//!
//! Builds requests against the configured base URL, attaches the bearer
//! credential handed in by the caller, and unwraps the `{code, message, data}`
//! envelope. Every failure is reported to the [`Notifier`] before it is
//! returned.

use std::sync::Arc;

use anyhow::Context;
use eden_console_protocol::{ResponseEnvelope, CODE_UNAUTHORIZED};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::credential::Credential;
use crate::error::{RequestError, Result};
use crate::notify::Notifier;

/// One call to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path below the base URL, e.g. `/api/v1/users`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// The reply is the payload itself rather than an envelope
    pub bare: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bare: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append the fields of `params` as query parameters.
    ///
    /// `params` must serialize to a map. Null values are dropped, arrays
    /// repeat the key once per element.
    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        let value = serde_json::to_value(params)
            .map_err(|e| RequestError::Validation(format!("query parameters: {e}")))?;
        let Value::Object(map) = value else {
            return Err(RequestError::Validation(
                "query parameters must be a map".to_string(),
            ));
        };

        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = query_text(item) {
                            self.query.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = query_text(other) {
                        self.query.push((key, text));
                    }
                }
            }
        }
        Ok(self)
    }

    /// Single query parameter
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// JSON request body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| RequestError::Validation(format!("request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }
}

fn query_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Percent-encode a value used as a single path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// HTTP client bound to one backend
pub struct Transport {
    http_client: reqwest::Client,
    base_url: String,
    success_codes: Vec<i64>,
    notifier: Arc<dyn Notifier>,
}

impl Transport {
    pub fn new(config: &ApiConfig, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            success_codes: config.success_codes.clone(),
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Perform `request`, authenticating with `credential` when present.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<ResponseEnvelope<T>> {
        let result = self.dispatch(request, credential).await;
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// Surface `error` to the user
    pub fn report(&self, error: &RequestError) {
        self.notifier.notify(error.kind(), &error.user_message());
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<ResponseEnvelope<T>> {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = credential.is_some(),
            "dispatching request"
        );

        let mut builder = self
            .http_client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(credential) = credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response = builder.send().await.map_err(RequestError::Network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(RequestError::Network)?;

        tracing::debug!(status = status.as_u16(), path = %request.path, "response received");

        if !status.is_success() {
            return Err(RequestError::from_status(
                status.as_u16(),
                server_message(&body).as_deref(),
            ));
        }

        if request.bare {
            return self.unwrap_bare(&body);
        }

        self.unwrap_envelope(&body)
    }

    /// Bare bodies are the payload itself, but a rejected token still comes
    /// back as an envelope with a failure code.
    fn unwrap_bare<T: DeserializeOwned>(&self, body: &[u8]) -> Result<ResponseEnvelope<T>> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| RequestError::Decode(e.to_string()))?;

        if let Some(code) = value.get("code").and_then(Value::as_i64) {
            if !self.success_codes.contains(&code) {
                let message = value.get("message").and_then(Value::as_str);
                return Err(code_failure(code, message.unwrap_or_default()));
            }
        }

        let data = serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(ResponseEnvelope::ok(data))
    }

    fn unwrap_envelope<T: DeserializeOwned>(&self, body: &[u8]) -> Result<ResponseEnvelope<T>> {
        // Payload shape is only checked once the code says success
        let envelope: ResponseEnvelope<Value> =
            serde_json::from_slice(body).map_err(|e| RequestError::Decode(e.to_string()))?;

        if !envelope.is_success(&self.success_codes) {
            return Err(code_failure(envelope.code, &envelope.message));
        }

        let data = match envelope.data {
            Some(value) => {
                Some(serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))?)
            }
            None => None,
        };

        Ok(ResponseEnvelope {
            code: envelope.code,
            message: envelope.message,
            data,
        })
    }
}

/// Failure named by a non-success embedded code
fn code_failure(code: i64, message: &str) -> RequestError {
    if code == CODE_UNAUTHORIZED {
        return RequestError::from_envelope_unauthenticated(message);
    }
    RequestError::Application {
        code,
        message: message.to_string(),
    }
}

/// `message` of an error envelope, or `error` of a bare error body
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(ToString::to_string)
}
