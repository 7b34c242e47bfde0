use std::collections::HashMap;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use davenport_core::resolve_status_message;

use crate::{Client, ClientError, Result};

const USER_AGENT_STRING: &str = concat!("davenport/", env!("CARGO_PKG_VERSION"));

/// Per-call request specification handed to the gateway.
///
/// Built fresh for every call and never shared or mutated afterwards.
/// Callers are responsible for percent-encoding untrusted path segments
/// (database names, document ids) before they enter `path`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) path: String,
    pub(crate) method: Method,
    pub(crate) body: Option<Value>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status_text: HashMap<u16, String>,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            status_text: HashMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Extra header; wins over the baseline headers on name collision.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the diagnostic message for an expected status code.
    /// Never used for control flow.
    pub fn status_text(mut self, status: u16, text: impl Into<String>) -> Self {
        self.status_text.insert(status, text.into());
        self
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        // Server root
        Self::new("/")
    }
}

/// `COPY` has no constant in the http crate.
pub(crate) fn copy_method() -> Method {
    Method::from_bytes(b"COPY").expect("static method token")
}

impl Client {
    /// Issue one HTTP call described by `descriptor` and normalize the
    /// outcome.
    ///
    /// Resolves with the decoded JSON response body on any 2xx/3xx status
    /// (`Value::Null` for empty bodies, e.g. HEAD), rejects with
    /// [`ClientError::Remote`] otherwise. Exactly one of the two happens
    /// per call; there are no retries and failures are not logged here.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value> {
        let started = Instant::now();
        let url = format!("{}{}", self.base_url, descriptor.path);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &descriptor.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::InvalidRequest(format!("bad header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ClientError::InvalidRequest(format!("bad value for header {}: {}", name, e))
            })?;
            // insert replaces, so caller headers win over the baseline
            headers.insert(name, value);
        }

        let mut builder = self
            .http
            .request(descriptor.method.clone(), &url)
            .headers(headers);
        if let Some(credentials) = &self.config.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => return Err(transport_error(error, &descriptor, started)),
        };

        let status = response.status().as_u16();
        let message = resolve_status_message(status, &descriptor.status_text);

        if !(response.status().is_success() || response.status().is_redirection()) {
            let body = response.json::<Value>().await.ok();
            return Err(ClientError::Remote {
                status,
                message,
                body,
                elapsed: started.elapsed(),
                source: None,
            });
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                return Err(ClientError::Remote {
                    status,
                    message,
                    body: None,
                    elapsed: started.elapsed(),
                    source: Some(error),
                })
            }
        };
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        if self.config.logging {
            tracing::info!(
                target: "davenport::gateway",
                status,
                message = %message,
                body = %text,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request completed"
            );
        }

        Ok(body)
    }

    /// Gateway call with the response deserialized into a typed envelope.
    pub(crate) async fn request_typed<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T> {
        let value = self.request(descriptor).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Normalize a failure that never produced a response. The status code is
/// taken from the error when present, 500 otherwise.
fn transport_error(
    error: reqwest::Error,
    descriptor: &RequestDescriptor,
    started: Instant,
) -> ClientError {
    let status = error.status().map(|s| s.as_u16()).unwrap_or(500);
    ClientError::Remote {
        status,
        message: resolve_status_message(status, &descriptor.status_text),
        body: None,
        elapsed: started.elapsed(),
        source: Some(error),
    }
}
