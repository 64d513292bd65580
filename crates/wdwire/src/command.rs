//! Per-call command model and placeholder resolution.
//!
//! A [`Command`] is a copy of a catalog template plus everything one call
//! needs: the session id, an optional element id, named route parameters and
//! an optional JSON payload. It is created fresh for every invocation and
//! discarded once the response has been processed.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{CommandTemplate, HttpMethod};

const SESSION_PLACEHOLDER: &str = "$[session]";
const ELEMENT_PLACEHOLDER: &str = "$[element]";

/// Bytes escaped when a value is substituted into a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Opaque handle of a remote session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One invocation of a catalog command.
///
/// # Example
///
/// ```
/// use wdwire::catalog::CommandCatalog;
/// use wdwire::command::{Command, SessionId};
///
/// let catalog = CommandCatalog::standard();
/// let template = catalog.lookup("GetElementText").expect("standard command");
/// let command = Command::new(template)
///     .with_session(SessionId::new("abc-1"))
///     .with_element("e7");
/// assert_eq!(command.resolve_route(), "/session/abc-1/element/e7/text");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    template: CommandTemplate,
    session: Option<SessionId>,
    element: Option<String>,
    parameters: BTreeMap<String, String>,
    payload: Option<Value>,
}

impl Command {
    /// Copies a template into a fresh command.
    #[must_use]
    pub fn new(template: &CommandTemplate) -> Self {
        Self {
            template: template.clone(),
            session: None,
            element: None,
            parameters: BTreeMap::new(),
            payload: None,
        }
    }

    /// Sets the session id substituted for `$[session]`.
    #[must_use]
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the element id substituted for `$[element]`.
    #[must_use]
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Sets a named route parameter substituted for `$[name]`.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Replaces the session id in place.
    pub fn set_session(&mut self, session: Option<SessionId>) {
        self.session = session;
    }

    /// Template this command was copied from.
    #[must_use]
    pub const fn template(&self) -> &CommandTemplate {
        &self.template
    }

    /// Logical command name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.template.name()
    }

    /// HTTP verb.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.template.method()
    }

    /// Session id, when set.
    #[must_use]
    pub const fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Returns `true` when no session id is set or the id is empty.
    #[must_use]
    pub fn has_empty_session(&self) -> bool {
        self.session.as_ref().is_none_or(SessionId::is_empty)
    }

    /// Element id, when set.
    #[must_use]
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Payload, when set.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Resolves the route pattern into a concrete path.
    ///
    /// `$[session]` is always replaced (by the empty string when no session is
    /// set) and `$[element]` is replaced when an element id is present. Named
    /// parameters replace their `$[name]` token. Any other token is left in
    /// place for the remote end to reject.
    ///
    /// Substituted values are percent-encoded as single path segments, so a
    /// `#`, `?` or `/` inside an id or parameter cannot change the target.
    #[must_use]
    pub fn resolve_route(&self) -> String {
        let session = self.session.as_ref().map_or("", SessionId::as_str);
        let mut route = self
            .template
            .route()
            .replace(SESSION_PLACEHOLDER, &encode_segment(session));
        if let Some(element) = self.element.as_deref() {
            route = route.replace(ELEMENT_PLACEHOLDER, &encode_segment(element));
        }
        for (name, value) in &self.parameters {
            route = route.replace(&format!("$[{name}]"), &encode_segment(value));
        }
        route
    }
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::catalog::CommandCatalog;

    fn command(name: &str) -> Command {
        let catalog = CommandCatalog::standard();
        Command::new(catalog.lookup(name).expect("standard command"))
    }

    #[test]
    fn every_session_route_resolves_the_session_token() {
        let catalog = CommandCatalog::standard();
        for template in catalog.iter_sorted() {
            let route = Command::new(template)
                .with_session(SessionId::new("abc-1"))
                .resolve_route();
            assert!(
                !route.contains(SESSION_PLACEHOLDER),
                "{} left a session token in {route}",
                template.name()
            );
            if template.route().contains(SESSION_PLACEHOLDER) {
                assert!(route.contains("abc-1"), "{} lost the session id", template.name());
            }
        }
    }

    #[test]
    fn resolves_named_parameters() {
        let route = command("GetElementAttribute")
            .with_session(SessionId::new("s"))
            .with_element("e")
            .with_parameter("name", "href")
            .resolve_route();
        assert_eq!(route, "/session/s/element/e/attribute/href");
    }

    #[rstest]
    #[case::fragment("a#b", "/session/s1/cookie/a%23b")]
    #[case::query("a?b", "/session/s1/cookie/a%3Fb")]
    #[case::separator("a/b", "/session/s1/cookie/a%2Fb")]
    #[case::percent("100%", "/session/s1/cookie/100%25")]
    #[case::space("a b", "/session/s1/cookie/a%20b")]
    #[case::plain("sid_2-x.y", "/session/s1/cookie/sid_2-x.y")]
    fn parameter_values_are_escaped_as_one_segment(#[case] name: &str, #[case] expected: &str) {
        let route = command("DeleteCookie")
            .with_session(SessionId::new("s1"))
            .with_parameter("name", name)
            .resolve_route();
        assert_eq!(route, expected);
    }

    #[test]
    fn session_and_element_ids_are_escaped() {
        let route = command("GetElementText")
            .with_session(SessionId::new("s/1"))
            .with_element("e?2")
            .resolve_route();
        assert_eq!(route, "/session/s%2F1/element/e%3F2/text");
    }

    #[test]
    fn unresolved_placeholders_stay_verbatim() {
        let route = command("GetElementAttribute")
            .with_session(SessionId::new("s"))
            .resolve_route();
        assert_eq!(route, "/session/s/element/$[element]/attribute/$[name]");
    }

    #[rstest]
    #[case::missing(None, true)]
    #[case::empty(Some(""), true)]
    #[case::present(Some("s1"), false)]
    fn detects_empty_session(#[case] session: Option<&str>, #[case] expected: bool) {
        let mut command = command("GetTitle");
        command.set_session(session.map(SessionId::from));
        assert_eq!(command.has_empty_session(), expected);
    }

    #[test]
    fn template_is_copied_not_shared() {
        let catalog = CommandCatalog::standard();
        let template = catalog.lookup("GetTitle").expect("standard command");
        let command = Command::new(template).with_session(SessionId::new("s"));
        assert_eq!(template.route(), "/session/$[session]/title");
        assert_eq!(command.resolve_route(), "/session/s/title");
    }
}
