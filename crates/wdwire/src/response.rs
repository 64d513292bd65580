//! Response envelope decoding and validation.
//!
//! Every response body is `{"value": ...}`. On failure the value is an error
//! envelope `{"error", "message", "stacktrace"}` whose wire code selects an
//! [`ErrorKind`]. [`validate`] returns the successful value or the classified
//! failure; [`decode_value`] converts a value into a caller type.

use std::any::type_name;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::command::Command;
use crate::error::{ErrorKind, RemoteError, WebDriverError};
use crate::transport::HttpResponse;

const NOT_FOUND: u16 = 404;

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    value: Value,
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
}

/// Decoded `{"value": ...}` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// HTTP status.
    pub status: u16,
    /// The `value` member; `null` when absent.
    pub value: Value,
    /// Top-level `sessionId`, sent by some legacy remote ends.
    pub session_id: Option<String>,
}

impl ResponseEnvelope {
    /// Parses a response body; `None` when it is not a JSON object.
    #[must_use]
    pub fn parse(response: &HttpResponse) -> Option<Self> {
        let raw: RawEnvelope = serde_json::from_str(&response.body).ok()?;
        Some(Self {
            status: response.status,
            value: raw.value,
            session_id: raw.session_id,
        })
    }

    /// Error envelope carried in the value, if any.
    #[must_use]
    pub fn error(&self) -> Option<ErrorEnvelope> {
        ErrorEnvelope::from_value(&self.value, self.status)
    }
}

/// Decoded error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Wire code as received.
    pub error: String,
    /// Remote message.
    pub message: String,
    /// Remote stack trace, when present and non-empty.
    pub stacktrace: Option<String>,
    /// HTTP status of the response.
    pub status: u16,
}

impl ErrorEnvelope {
    /// Reads an error envelope from a response value.
    ///
    /// Returns `None` unless the value is an object with a string `error`
    /// member.
    #[must_use]
    pub fn from_value(value: &Value, status: u16) -> Option<Self> {
        let object = value.as_object()?;
        let error = object.get("error")?.as_str()?.to_owned();
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let stacktrace = object
            .get("stacktrace")
            .and_then(Value::as_str)
            .filter(|trace| !trace.is_empty())
            .map(str::to_owned);
        Some(Self {
            error,
            message,
            stacktrace,
            status,
        })
    }

    /// Classifies the envelope into a typed failure.
    #[must_use]
    pub fn into_error(self) -> WebDriverError {
        match ErrorKind::from_wire_code(&self.error) {
            Some(kind) => WebDriverError::Remote(RemoteError {
                kind,
                message: self.message,
                stacktrace: self.stacktrace,
                status: self.status,
            }),
            None => WebDriverError::Protocol {
                code: self.error,
                message: self.message,
                status: self.status,
            },
        }
    }
}

/// Validates a raw response for the command that produced it.
///
/// # Errors
///
/// - [`ErrorKind::NoSuchSession`] for HTTP 404 when the command carried no
///   session id.
/// - [`WebDriverError::Remote`] when an error envelope with a known wire code
///   is present.
/// - [`WebDriverError::Protocol`] for an unknown wire code, or a non-success
///   status without a decodable envelope.
/// - [`WebDriverError::Decode`] when a successful body is not JSON.
pub fn validate(command: &Command, response: HttpResponse) -> Result<Value, WebDriverError> {
    let envelope = ResponseEnvelope::parse(&response);
    let error = envelope.as_ref().and_then(ResponseEnvelope::error);

    if response.status == NOT_FOUND && command.has_empty_session() {
        let message = error.map_or(response.body, |envelope| envelope.message);
        return Err(WebDriverError::Remote(RemoteError {
            kind: ErrorKind::NoSuchSession,
            message,
            stacktrace: None,
            status: NOT_FOUND,
        }));
    }

    if let Some(error) = error {
        return Err(error.into_error());
    }

    if !response.is_success() {
        return Err(WebDriverError::Protocol {
            code: String::new(),
            message: response.body,
            status: response.status,
        });
    }

    match envelope {
        Some(envelope) => Ok(envelope.value),
        None if response.body.trim().is_empty() => Ok(Value::Null),
        None => Err(WebDriverError::Decode {
            message: format!("response to {} is not a JSON object", command.name()),
            source: None,
        }),
    }
}

fn is_wrapped(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

fn decode_error<T>(source: serde_json::Error) -> WebDriverError {
    WebDriverError::Decode {
        message: format!("cannot decode value into {}", type_name::<T>()),
        source: Some(source),
    }
}

/// Converts a response value into `T`.
///
/// `null` yields `T::default()`. A string whose content is not wrapped in
/// `{}` or `[]` is a bare scalar: it decodes as a string when `T` accepts
/// one and is otherwise parsed, so `"42"` becomes `42` for numeric types.
/// Wrapped string content and every other value decode structurally.
///
/// # Errors
///
/// Returns [`WebDriverError::Decode`] when the value does not fit `T`.
pub fn decode_value<T>(value: Value) -> Result<T, WebDriverError>
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Null => Ok(T::default()),
        Value::String(text) => {
            let trimmed = text.trim();
            if is_wrapped(trimmed) {
                serde_json::from_str(trimmed)
                    .or_else(|_| serde_json::from_value(Value::String(text.clone())))
                    .map_err(decode_error::<T>)
            } else {
                serde_json::from_value(Value::String(text.clone()))
                    .or_else(|_| serde_json::from_str(trimmed))
                    .map_err(decode_error::<T>)
            }
        }
        other => serde_json::from_value(other).map_err(decode_error::<T>),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::catalog::CommandCatalog;
    use crate::command::SessionId;

    fn command(session: Option<&str>) -> Command {
        let catalog = CommandCatalog::standard();
        let mut command = Command::new(catalog.lookup("GetTitle").expect("standard command"));
        command.set_session(session.map(SessionId::from));
        command
    }

    fn error_body(code: &str, message: &str) -> String {
        json!({ "value": { "error": code, "message": message, "stacktrace": "" } }).to_string()
    }

    #[test]
    fn success_returns_value_verbatim() {
        let value = validate(
            &command(Some("s1")),
            HttpResponse::new(200, r#"{"value":{"a":[1,2]}}"#),
        )
        .expect("success");
        assert_eq!(value, json!({ "a": [1, 2] }));
    }

    #[rstest]
    #[case::missing_value(r#"{}"#)]
    #[case::empty_body("")]
    fn success_without_value_is_null(#[case] body: &str) {
        let value = validate(&command(Some("s1")), HttpResponse::new(200, body)).expect("success");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn every_wire_code_raises_its_kind() {
        for kind in ErrorKind::ALL {
            let error = validate(
                &command(Some("s1")),
                HttpResponse::new(kind.http_status(), error_body(kind.wire_code(), "m")),
            )
            .expect_err("error envelope");
            match error {
                WebDriverError::Remote(remote) => {
                    assert_eq!(remote.kind, kind);
                    assert_eq!(remote.message, "m");
                    assert_eq!(remote.status, kind.http_status());
                }
                other => panic!("{kind} produced {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_wire_code_falls_back_to_protocol_error() {
        let error = validate(
            &command(Some("s1")),
            HttpResponse::new(500, error_body("flux capacitor failure", "m")),
        )
        .expect_err("error envelope");
        assert!(matches!(
            error,
            WebDriverError::Protocol { ref code, ref message, status: 500 }
                if code == "flux capacitor failure" && message == "m"
        ));
    }

    #[test]
    fn stacktrace_is_kept() {
        let body = json!({
            "value": { "error": "javascript error", "message": "boom", "stacktrace": "at line 1" }
        })
        .to_string();
        let error = validate(&command(Some("s1")), HttpResponse::new(500, body))
            .expect_err("error envelope");
        match error {
            WebDriverError::Remote(remote) => {
                assert_eq!(remote.stacktrace.as_deref(), Some("at line 1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(""))]
    fn not_found_without_session_is_no_such_session(#[case] session: Option<&str>) {
        let error = validate(
            &command(session),
            HttpResponse::new(404, error_body("unknown command", "m")),
        )
        .expect_err("404");
        assert_eq!(error.kind(), Some(ErrorKind::NoSuchSession));
    }

    #[test]
    fn not_found_with_session_uses_the_envelope() {
        let error = validate(
            &command(Some("s1")),
            HttpResponse::new(404, error_body("no such element", "m")),
        )
        .expect_err("404");
        assert_eq!(error.kind(), Some(ErrorKind::NoSuchElement));
    }

    #[test]
    fn failure_status_without_envelope_is_protocol_error() {
        let error = validate(
            &command(Some("s1")),
            HttpResponse::new(502, "<html>bad gateway</html>"),
        )
        .expect_err("502");
        assert!(matches!(
            error,
            WebDriverError::Protocol { ref message, status: 502, .. } if message.contains("bad gateway")
        ));
    }

    #[test]
    fn error_envelope_with_success_status_still_fails() {
        let error = validate(
            &command(Some("s1")),
            HttpResponse::new(200, error_body("no such alert", "none open")),
        )
        .expect_err("error envelope");
        assert_eq!(error.kind(), Some(ErrorKind::NoSuchAlert));
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let error = validate(&command(Some("s1")), HttpResponse::new(200, "plain text"))
            .expect_err("not json");
        assert!(matches!(error, WebDriverError::Decode { .. }));
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Point {
        x: i64,
    }

    #[test]
    fn null_decodes_to_default() {
        assert_eq!(decode_value::<i64>(Value::Null).expect("null"), 0);
        assert_eq!(decode_value::<String>(Value::Null).expect("null"), "");
    }

    #[test]
    fn bare_scalar_string_is_parsed() {
        assert_eq!(decode_value::<i64>(json!("42")).expect("scalar"), 42);
        assert!(decode_value::<bool>(json!("true")).expect("scalar"));
        assert_eq!(decode_value::<String>(json!("42")).expect("string"), "42");
    }

    #[test]
    fn structured_value_decodes() {
        assert_eq!(
            decode_value::<Point>(json!({ "x": 1 })).expect("struct"),
            Point { x: 1 }
        );
        assert_eq!(
            decode_value::<Point>(json!("{\"x\":1}")).expect("wrapped string"),
            Point { x: 1 }
        );
        assert_eq!(
            decode_value::<Vec<i64>>(json!([1, 2])).expect("array"),
            vec![1, 2]
        );
    }

    #[test]
    fn mismatched_value_is_a_decode_error() {
        let error = decode_value::<i64>(json!("forty-two")).expect_err("not a number");
        assert!(matches!(error, WebDriverError::Decode { source: Some(_), .. }));
    }
}
