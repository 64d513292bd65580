//! Error taxonomy for the WebDriver client core.
//!
//! Remote failures arrive as an error envelope carrying a lowercase,
//! space-separated wire code. Each code maps to exactly one [`ErrorKind`]
//! through a fixed table, and each kind owns the HTTP status the remote end is
//! expected to send with it. Transport failures (connection, timeout,
//! authorisation) are synthesised locally and never appear in that table.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::HttpMethod;
use crate::service::ServiceError;

/// Coarse grouping of wire error kinds.
///
/// Polling helpers outside the core use the group to decide whether a failure
/// is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorGroup {
    /// The addressed element, window, frame, alert, cookie or shadow root is
    /// missing or not in a usable state.
    ElementState,
    /// The request itself was malformed.
    RequestShape,
    /// The session is missing, invalid or could not be created.
    Session,
    /// Script execution or command dispatch failed on the remote end.
    Execution,
    /// The browser environment refused the operation.
    Environment,
}

/// Every error kind that can arrive in a WebDriver error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `element click intercepted`
    ElementClickIntercepted,
    /// `element not interactable`
    ElementNotInteractable,
    /// `insecure certificate`
    InsecureCertificate,
    /// `invalid argument`
    InvalidArgument,
    /// `invalid cookie domain`
    InvalidCookieDomain,
    /// `invalid element state`
    InvalidElementState,
    /// `invalid selector`
    InvalidSelector,
    /// `invalid session id`
    InvalidSessionId,
    /// `no such session`; also synthesised for a 404 on a session-less command.
    NoSuchSession,
    /// `javascript error`
    JavascriptError,
    /// `move target out of bounds`
    MoveTargetOutOfBounds,
    /// `no such alert`
    NoSuchAlert,
    /// `no such cookie`
    NoSuchCookie,
    /// `no such element`
    NoSuchElement,
    /// `no such frame`
    NoSuchFrame,
    /// `no such window`
    NoSuchWindow,
    /// `no such shadow root`
    NoSuchShadowRoot,
    /// `detached shadow root`
    DetachedShadowRoot,
    /// `script timeout`
    ScriptTimeout,
    /// `session not created`
    SessionNotCreated,
    /// `stale element reference`
    StaleElementReference,
    /// `timeout`
    Timeout,
    /// `unable to set cookie`
    UnableToSetCookie,
    /// `unable to capture screen`
    UnableToCaptureScreen,
    /// `unexpected alert open`
    UnexpectedAlertOpen,
    /// `unknown command`
    UnknownCommand,
    /// `unknown error`
    UnknownError,
    /// `unknown method`
    UnknownMethod,
    /// `unsupported operation`
    UnsupportedOperation,
}

impl ErrorKind {
    /// All kinds, in table order.
    pub const ALL: [Self; 29] = [
        Self::ElementClickIntercepted,
        Self::ElementNotInteractable,
        Self::InsecureCertificate,
        Self::InvalidArgument,
        Self::InvalidCookieDomain,
        Self::InvalidElementState,
        Self::InvalidSelector,
        Self::InvalidSessionId,
        Self::NoSuchSession,
        Self::JavascriptError,
        Self::MoveTargetOutOfBounds,
        Self::NoSuchAlert,
        Self::NoSuchCookie,
        Self::NoSuchElement,
        Self::NoSuchFrame,
        Self::NoSuchWindow,
        Self::NoSuchShadowRoot,
        Self::DetachedShadowRoot,
        Self::ScriptTimeout,
        Self::SessionNotCreated,
        Self::StaleElementReference,
        Self::Timeout,
        Self::UnableToSetCookie,
        Self::UnableToCaptureScreen,
        Self::UnexpectedAlertOpen,
        Self::UnknownCommand,
        Self::UnknownError,
        Self::UnknownMethod,
        Self::UnsupportedOperation,
    ];

    const fn descriptor(self) -> (&'static str, u16) {
        match self {
            Self::ElementClickIntercepted => ("element click intercepted", 400),
            Self::ElementNotInteractable => ("element not interactable", 400),
            Self::InsecureCertificate => ("insecure certificate", 400),
            Self::InvalidArgument => ("invalid argument", 400),
            Self::InvalidCookieDomain => ("invalid cookie domain", 400),
            Self::InvalidElementState => ("invalid element state", 400),
            Self::InvalidSelector => ("invalid selector", 400),
            Self::InvalidSessionId => ("invalid session id", 404),
            Self::NoSuchSession => ("no such session", 404),
            Self::JavascriptError => ("javascript error", 500),
            Self::MoveTargetOutOfBounds => ("move target out of bounds", 500),
            Self::NoSuchAlert => ("no such alert", 404),
            Self::NoSuchCookie => ("no such cookie", 404),
            Self::NoSuchElement => ("no such element", 404),
            Self::NoSuchFrame => ("no such frame", 404),
            Self::NoSuchWindow => ("no such window", 404),
            Self::NoSuchShadowRoot => ("no such shadow root", 404),
            Self::DetachedShadowRoot => ("detached shadow root", 404),
            Self::ScriptTimeout => ("script timeout", 500),
            Self::SessionNotCreated => ("session not created", 500),
            Self::StaleElementReference => ("stale element reference", 404),
            Self::Timeout => ("timeout", 500),
            Self::UnableToSetCookie => ("unable to set cookie", 500),
            Self::UnableToCaptureScreen => ("unable to capture screen", 500),
            Self::UnexpectedAlertOpen => ("unexpected alert open", 500),
            Self::UnknownCommand => ("unknown command", 404),
            Self::UnknownError => ("unknown error", 500),
            Self::UnknownMethod => ("unknown method", 405),
            Self::UnsupportedOperation => ("unsupported operation", 500),
        }
    }

    /// Wire code carried in the `error` field of the envelope.
    #[must_use]
    pub const fn wire_code(self) -> &'static str {
        self.descriptor().0
    }

    /// HTTP status the remote end sends alongside this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        self.descriptor().1
    }

    /// Resolves a wire code, ignoring ASCII case and surrounding whitespace.
    #[must_use]
    pub fn from_wire_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.wire_code().eq_ignore_ascii_case(code))
    }

    /// Coarse group used by retry decisions.
    #[must_use]
    pub const fn group(self) -> ErrorGroup {
        match self {
            Self::ElementNotInteractable
            | Self::InvalidElementState
            | Self::StaleElementReference
            | Self::DetachedShadowRoot
            | Self::NoSuchElement
            | Self::NoSuchWindow
            | Self::NoSuchFrame
            | Self::NoSuchAlert
            | Self::NoSuchCookie
            | Self::NoSuchShadowRoot => ErrorGroup::ElementState,
            Self::InvalidArgument | Self::InvalidSelector | Self::InvalidCookieDomain => {
                ErrorGroup::RequestShape
            }
            Self::InvalidSessionId | Self::NoSuchSession | Self::SessionNotCreated => {
                ErrorGroup::Session
            }
            Self::JavascriptError
            | Self::ScriptTimeout
            | Self::Timeout
            | Self::UnknownCommand
            | Self::UnknownMethod
            | Self::UnknownError
            | Self::UnsupportedOperation => ErrorGroup::Execution,
            Self::InsecureCertificate
            | Self::UnableToCaptureScreen
            | Self::UnableToSetCookie
            | Self::MoveTargetOutOfBounds
            | Self::ElementClickIntercepted
            | Self::UnexpectedAlertOpen => ErrorGroup::Environment,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_code())
    }
}

/// A classified failure reported by the remote end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    /// Classified kind.
    pub kind: ErrorKind,
    /// Remote message, verbatim.
    pub message: String,
    /// Remote stack trace, when one was sent.
    pub stacktrace: Option<String>,
    /// HTTP status of the response.
    pub status: u16,
}

impl RemoteError {
    /// Builds an error of the given kind with its expected status.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stacktrace: None,
            status: kind.http_status(),
        }
    }
}

/// Errors surfaced by the WebDriver client core.
#[derive(Debug, Error)]
pub enum WebDriverError {
    /// The remote end reported a failure with a recognised wire code.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The remote end reported a failure the taxonomy does not recognise.
    #[error("remote end returned unrecognised error '{code}' (HTTP {status}): {message}")]
    Protocol {
        /// Wire code as received; empty when no envelope could be decoded.
        code: String,
        /// Remote message or raw response body.
        message: String,
        /// HTTP status of the response.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error(
        "{method} {route} timed out after {} ms (session: {}, element: {})",
        .timeout.as_millis(),
        .session.as_deref().unwrap_or("-"),
        .element.as_deref().unwrap_or("-")
    )]
    Timeout {
        /// Configured timeout that elapsed.
        timeout: Duration,
        /// HTTP method of the abandoned request.
        method: HttpMethod,
        /// Resolved route of the abandoned request.
        route: String,
        /// Session id carried by the command, when present.
        session: Option<String>,
        /// Element id carried by the command, when present.
        element: Option<String>,
    },

    /// The remote end could not be reached.
    #[error("failed to reach remote end: {message}")]
    Connection {
        /// Underlying transport message.
        message: String,
    },

    /// The remote end rejected the credentials (HTTP 401).
    #[error("remote end rejected the request as unauthorised: {message}")]
    Unauthorized {
        /// Response body, verbatim.
        message: String,
    },

    /// The command name is not present in the catalog.
    #[error("command '{name}' is not supported by this client")]
    NotSupported {
        /// Name that was looked up.
        name: String,
    },

    /// The command payload could not be serialised.
    #[error("failed to serialise command payload: {0}")]
    SerializePayload(#[source] serde_json::Error),

    /// A successful response could not be decoded into the requested type.
    #[error("failed to decode response value: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The configured server address is unusable.
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl {
        /// Offending value.
        url: String,
        /// Parser or validation message.
        reason: String,
    },

    /// The managed driver service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl WebDriverError {
    /// Classified wire kind, when the failure came from the remote end.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Remote(remote) => Some(remote.kind),
            _ => None,
        }
    }

    /// Whether a polling caller may retry the command that produced this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Remote(remote) => {
                remote.kind == ErrorKind::ScriptTimeout
                    || remote.kind.group() == ErrorGroup::ElementState
            }
            _ => false,
        }
    }

    /// Whether the failure happened below the protocol layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::Unauthorized { .. }
        )
    }
}
