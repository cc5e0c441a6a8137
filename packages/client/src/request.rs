use std::sync::Arc;
use std::time::Duration;

use common::ResponseEnvelope;
use common::config::ServerConfig;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ClientError, FailureKind, classify_status};
use crate::navigate::{LOGIN_ROUTE, Navigator};
use crate::notify::{Notifier, Toast, ToastLevel};
use crate::session::SessionStore;

pub const PLEASE_LOGIN_KEY: &str = "please-login";
pub const BACKEND_OFFLINE_KEY: &str = "502-backend-offline";
pub const REQUEST_TIMEOUT_KEY: &str = "request-timeout";

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    /// Query parameters, encoded from any serializable struct or map.
    pub query: Option<Value>,
    /// On 401, still clear the session but skip the redirect and the
    /// "please sign in" notification.
    pub ignore_unauthorized: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ClientError> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    pub fn ignore_unauthorized(mut self) -> Self {
        self.ignore_unauthorized = true;
        self
    }
}

/// A successful reply.
#[derive(Debug)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Cookies set by this response, as `(name, value)`.
    pub cookies: Vec<(String, String)>,
    pub envelope: ResponseEnvelope<T>,
}

/// HTTP client for the platform API.
///
/// Every response passes through one interception pipeline, so callers only
/// ever see a parsed envelope or a classified [`ClientError`].
pub struct RequestClient {
    http: reqwest::Client,
    api_root: String,
    timeout: Duration,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl RequestClient {
    pub fn new(
        config: &ServerConfig,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("cdsctf-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_root: config.api_root(),
            timeout: config.timeout(),
            session,
            notifier,
            navigator,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<T>, ClientError> {
        self.call(Method::GET, path, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<T>, ClientError> {
        self.call(Method::POST, path, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<T>, ClientError> {
        self.call(Method::PUT, path, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<T>, ClientError> {
        self.call(Method::DELETE, path, options).await
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<T>, ClientError> {
        self.send(method, path, options)
            .await
            .map(|reply| reply.envelope)
    }

    /// Like [`call`](Self::call), but keeps the status and headers.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Reply<T>, ClientError> {
        let url = self.url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .timeout(self.timeout);
        if let Some(query) = &options.query {
            request = request.query(query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.on_transport_error(&method, &url, e)),
        };
        let status = response.status();
        let headers = response.headers().clone();
        let cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(self.on_transport_error(&method, &url, e)),
        };
        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "Response received");

        self.intercept(status, headers, &body, &options)
            .map(|reply| Reply { cookies, ..reply })
    }

    /// Response stage of the pipeline: 401, 502, other non-2xx, 2xx.
    fn intercept<T: DeserializeOwned>(
        &self,
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
        options: &RequestOptions,
    ) -> Result<Reply<T>, ClientError> {
        match classify_status(status) {
            Some(FailureKind::Auth) => {
                self.session.clear();
                if !options.ignore_unauthorized {
                    self.navigator.navigate(LOGIN_ROUTE);
                    self.notifier.show(please_sign_in());
                }
                info!(ignored = options.ignore_unauthorized, "Request unauthorized");
                Err(ClientError::Unauthorized(error_envelope(status, body)))
            }
            Some(FailureKind::Gateway) => {
                warn!(status = status.as_u16(), "Backend offline");
                self.notifier.show(backend_offline());
                Err(ClientError::Gateway(format!("HTTP {}", status.as_u16())))
            }
            Some(FailureKind::Request) | Some(FailureKind::Timeout) => Err(ClientError::Request {
                status,
                envelope: error_envelope(status, body),
            }),
            None => {
                let envelope = serde_json::from_slice(body)
                    .map_err(|source| ClientError::Decode { status, source })?;
                Ok(Reply {
                    status,
                    headers,
                    cookies: Vec::new(),
                    envelope,
                })
            }
        }
    }

    /// Transport stage: the deadline first, then unreachable backends.
    fn on_transport_error(&self, method: &Method, url: &str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            warn!(%method, url, timeout_ms = self.timeout.as_millis() as u64, "Request timed out");
            self.notifier.show(request_timeout());
            return ClientError::Timeout {
                after: self.timeout,
            };
        }
        if err.is_builder() {
            return ClientError::Transport(err);
        }

        warn!(%method, url, error = %err, "Backend unreachable");
        self.notifier.show(backend_offline());
        ClientError::Gateway(err.to_string())
    }
}

/// Parse an error body, falling back to a bare envelope when it is not one.
fn error_envelope(status: StatusCode, body: &[u8]) -> ResponseEnvelope<Value> {
    serde_json::from_slice(body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        ResponseEnvelope::bare(
            i64::from(status.as_u16()),
            (!text.is_empty()).then_some(text),
        )
    })
}

fn please_sign_in() -> Toast {
    Toast::new(PLEASE_LOGIN_KEY, ToastLevel::Warning, "Please sign in")
        .with_description("Sign in to continue.")
}

fn backend_offline() -> Toast {
    Toast::new(BACKEND_OFFLINE_KEY, ToastLevel::Error, "Server offline")
        .with_description("The server cannot handle requests right now.")
}

fn request_timeout() -> Toast {
    Toast::new(REQUEST_TIMEOUT_KEY, ToastLevel::Error, "Request timed out")
        .with_description("The server took too long to respond.")
}
