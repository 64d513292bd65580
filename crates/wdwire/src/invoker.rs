//! HTTP invocation engine.
//!
//! Turns a resolved [`Command`] into one HTTP round trip. Payload
//! serialisation, credential extraction, header policy and transport failure
//! classification all live here; interpreting the response envelope is left
//! to [`crate::response`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::command::Command;
use crate::error::WebDriverError;
use crate::response;
use crate::transport::{Credentials, HttpRequest, HttpResponse, Transport, TransportFailure};

pub(crate) const INVOKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::invoker");

const ACCEPT: &str = "application/json";
const EMPTY_BODY: &str = "{}";
const UNAUTHORIZED: u16 = 401;

/// Sends commands to one remote end.
#[derive(Clone)]
pub struct CommandInvoker {
    base: Url,
    credentials: Option<Credentials>,
    timeout: Duration,
    keep_alive: bool,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for CommandInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvoker")
            .field("base", &self.base.as_str())
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .field("keep_alive", &self.keep_alive)
            .finish_non_exhaustive()
    }
}

fn invalid_url(url: &str, reason: impl Into<String>) -> WebDriverError {
    WebDriverError::InvalidServerUrl {
        url: url.to_owned(),
        reason: reason.into(),
    }
}

impl CommandInvoker {
    /// Creates an invoker for `server_url`.
    ///
    /// User-info embedded in the URL is removed and sent as HTTP Basic
    /// credentials instead.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::InvalidServerUrl`] when the URL does not parse
    /// or does not use `http` or `https`.
    pub fn new(
        server_url: &str,
        timeout: Duration,
        keep_alive: bool,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, WebDriverError> {
        let mut base =
            Url::parse(server_url).map_err(|error| invalid_url(server_url, error.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid_url(server_url, "scheme must be http or https"));
        }

        let credentials = if base.username().is_empty() {
            None
        } else {
            Some(Credentials {
                username: base.username().to_owned(),
                password: base.password().map(str::to_owned),
            })
        };
        base.set_username("")
            .and_then(|()| base.set_password(None))
            .map_err(|()| invalid_url(server_url, "cannot strip user-info"))?;

        Ok(Self {
            base,
            credentials,
            timeout,
            keep_alive,
            transport,
        })
    }

    /// Server URL with user-info removed.
    #[must_use]
    pub const fn server_url(&self) -> &Url {
        &self.base
    }

    /// Per-command timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether requests ask the remote end to keep the connection open.
    #[must_use]
    pub const fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    fn endpoint(&self, route: &str) -> Result<Url, WebDriverError> {
        let joined = format!("{}{route}", self.base.as_str().trim_end_matches('/'));
        Url::parse(&joined).map_err(|error| invalid_url(&joined, error.to_string()))
    }

    /// Builds the HTTP request for a command without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::SerializePayload`] when the payload cannot be
    /// serialised and [`WebDriverError::InvalidServerUrl`] when the resolved
    /// route does not form a valid URL.
    pub fn prepare(&self, command: &Command) -> Result<HttpRequest, WebDriverError> {
        let method = command.method();
        let url = self.endpoint(&command.resolve_route())?;

        let body = if method.carries_body() {
            let text = match command.payload() {
                Some(payload) => {
                    serde_json::to_string(payload).map_err(WebDriverError::SerializePayload)?
                }
                None => EMPTY_BODY.to_owned(),
            };
            Some(text)
        } else {
            None
        };

        let mut headers = vec![(String::from("Accept"), ACCEPT.to_owned())];
        if body.is_some() {
            headers.push((
                String::from("Content-Type"),
                command.template().content_type().to_owned(),
            ));
        }
        let connection = if self.keep_alive { "keep-alive" } else { "close" };
        headers.push((String::from("Connection"), connection.to_owned()));

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            credentials: self.credentials.clone(),
            timeout: self.timeout,
        })
    }

    /// Sends a command and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::Timeout`] when the request exceeds the
    /// configured timeout, [`WebDriverError::Connection`] for any other
    /// transport failure and [`WebDriverError::Unauthorized`] for HTTP 401.
    pub fn send(&self, command: &Command) -> Result<HttpResponse, WebDriverError> {
        let request = self.prepare(command)?;
        debug!(
            target: INVOKER_TARGET,
            command = command.name(),
            method = %request.method,
            route = request.url.path(),
            session = command.session().map(|id| id.as_str()),
            "sending command"
        );

        match self.transport.execute(&request) {
            Ok(response) if response.status == UNAUTHORIZED => {
                debug!(target: INVOKER_TARGET, command = command.name(), "remote end returned 401");
                Err(WebDriverError::Unauthorized {
                    message: response.body,
                })
            }
            Ok(response) => {
                debug!(
                    target: INVOKER_TARGET,
                    command = command.name(),
                    status = response.status,
                    body_bytes = response.body.len(),
                    "received response"
                );
                Ok(response)
            }
            Err(TransportFailure::Timeout) => Err(WebDriverError::Timeout {
                timeout: self.timeout,
                method: request.method,
                route: command.resolve_route(),
                session: command.session().map(ToString::to_string),
                element: command.element().map(str::to_owned),
            }),
            Err(TransportFailure::Connection { message }) => {
                debug!(target: INVOKER_TARGET, command = command.name(), %message, "transport failure");
                Err(WebDriverError::Connection { message })
            }
        }
    }

    /// Sends a command and validates the response.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::send`] failures and every failure classified by
    /// [`response::validate`].
    pub fn execute(&self, command: &Command) -> Result<serde_json::Value, WebDriverError> {
        let response = self.send(command)?;
        response::validate(command, response)
    }
}
