//! HTTP client adapter.
//!
//! Every backend call goes through [`ApiClient::request`]: the relative path is
//! joined onto the configured base URL, the bearer token is read from the
//! injected [`TokenStore`] at build time, and the response is mapped to either
//! parsed JSON or an [`ApiError`]. No retry, no backoff.

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::session::TokenStore;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Optional query parameters or JSON body for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn params(params: Vec<(String, String)>) -> Self {
        Self { params, body: None }
    }

    pub fn body(body: Value) -> Self {
        Self {
            params: Vec::new(),
            body: Some(body),
        }
    }
}

/// A fully built outgoing request, before it hits the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Value of the `Authorization` header, if one will be sent.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// Raw status and body as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Wire seam. `Err` is reserved for requests that never got a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Default transport over a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout_ms: Option<u64>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout: timeout_ms.map(Duration::from_millis),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut rb = self
            .client
            .request(method, &request.url)
            .header("Content-Type", "application/json");
        if !request.query.is_empty() {
            rb = rb.query(&request.query);
        }
        if let Some(body) = &request.body {
            rb = rb.json(body);
        }
        if let Some(token) = &request.bearer {
            rb = rb.bearer_auth(token);
        }
        if let Some(t) = self.timeout {
            rb = rb.timeout(t);
        }

        let res = rb
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

/// Adapter shared by every endpoint group. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            tokens,
        }
    }

    pub fn from_config(cfg: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let transport = ReqwestTransport::new(cfg.request_timeout_ms)?;
        Ok(Self::new(cfg.api_url.clone(), Arc::new(transport), tokens))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn build_request(&self, method: Method, path: &str, opts: RequestOptions) -> ApiRequest {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        ApiRequest {
            method,
            url,
            query: opts.params,
            body: opts.body,
            bearer: self.tokens.access_token(),
        }
    }

    pub async fn request(&self, method: Method, path: &str, opts: RequestOptions) -> Result<Value> {
        let req = self.build_request(method, path, opts);
        if req.bearer.is_some() {
            log::debug!("[http] {} {} (authenticated)", method, req.url);
        } else {
            log::debug!("[http] {} {}", method, req.url);
        }

        let res = self.transport.execute(req).await.map_err(|e| {
            log::warn!("[http] {} {} failed: {}", method, path, e);
            e
        })?;
        interpret(method, path, res)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::Get, path, RequestOptions::default()).await
    }

    pub async fn get_with(&self, path: &str, params: Vec<(String, String)>) -> Result<Value> {
        self.request(Method::Get, path, RequestOptions::params(params))
            .await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let opts = RequestOptions {
            body,
            ..Default::default()
        };
        self.request(Method::Post, path, opts).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let opts = RequestOptions {
            body,
            ..Default::default()
        };
        self.request(Method::Put, path, opts).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::Delete, path, RequestOptions::default())
            .await
    }
}

fn interpret(method: Method, path: &str, res: ApiResponse) -> Result<Value> {
    if (200..300).contains(&res.status) {
        if res.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&res.body).map_err(|e| {
            log::warn!("[http] {} {} returned unparsable body: {}", method, path, e);
            ApiError::Decode(e.to_string())
        });
    }

    let message = error_message(res.status, &res.body);
    log::warn!("[http] {} {} -> {}: {}", method, path, res.status, message);
    Err(ApiError::Status {
        status: res.status,
        message,
    })
}

/// Backends attach their message under one of a few keys; fall back to the
/// raw text, then the status reason.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(m) = v.get(key).and_then(|m| m.as_str()) {
                return m.to_string();
            }
        }
    }
    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Percent-encode one path segment (ids come from user input and the backend).
pub fn seg(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
