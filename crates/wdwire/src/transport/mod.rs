//! Outbound HTTP transport.
//!
//! The [`Transport`] trait is the seam between the invocation engine and the
//! network. A transport executes exactly one request per call, never retries,
//! and keeps no per-connection header state, so one instance can be shared by
//! any number of sessions. [`ReqwestTransport`] is the production
//! implementation.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::catalog::HttpMethod;

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// Password, when one was supplied.
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Absolute request URL without user-info.
    pub url: Url,
    /// Request headers in send order.
    pub headers: Vec<(String, String)>,
    /// Serialised body; `None` for verbs that carry none.
    pub body: Option<String>,
    /// Basic credentials derived from the server URL.
    pub credentials: Option<Credentials>,
    /// Deadline for the whole round trip.
    pub timeout: Duration,
}

impl HttpRequest {
    /// First header value with the given name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as UTF-8.
    pub body: String,
}

impl HttpResponse {
    /// Builds a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The round trip did not complete before the request timeout.
    #[error("request timed out")]
    Timeout,
    /// DNS failure, refusal, reset or any other I/O problem.
    #[error("{message}")]
    Connection {
        /// Underlying error message.
        message: String,
    },
}

/// Executes HTTP requests for the invocation engine.
pub trait Transport: Send + Sync {
    /// Performs one round trip.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure`] when no response could be obtained.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// Blocking transport backed by `reqwest`.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport that talks to the remote end directly, ignoring
    /// proxy environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure::Connection`] when the HTTP client cannot be
    /// initialised, for example when the TLS backend fails to load.
    pub fn new() -> Result<Self, TransportFailure> {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .map_err(|error| TransportFailure::Connection {
                message: error.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

const fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn classify(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Connection {
            message: error.to_string(),
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, credentials.password.as_ref());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|error| classify(&error))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|error| classify(&error))?;
        Ok(HttpResponse { status, body })
    }
}
