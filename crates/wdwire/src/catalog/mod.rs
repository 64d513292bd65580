//! Declarative command catalog.
//!
//! The [`CommandCatalog`] maps logical command names to immutable
//! [`CommandTemplate`]s describing the HTTP verb, route pattern and content
//! type of one protocol operation. Routes may contain `$[name]` placeholders
//! that are resolved per call by [`Command`](crate::command::Command).
//!
//! The standard table is declared statically in [`standard`]; custom
//! [`CommandSource`]s may add or replace entries, last write wins.

use std::collections::HashMap;
use std::fmt;

use crate::error::WebDriverError;

mod standard;

/// Logical name of the readiness check.
pub const STATUS: &str = "Status";
/// Logical name of the session-creation command.
pub const NEW_SESSION: &str = "NewSession";
/// Logical name of the session teardown command.
pub const DELETE_SESSION: &str = "DeleteSession";

/// Content type sent with bodied requests unless a template overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// HTTP verbs used by the WebDriver protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Reads; never carries a body.
    Get,
    /// Writes; always carries a JSON body.
    Post,
    /// Deletions; never carries a body.
    Delete,
}

impl HttpMethod {
    /// Canonical upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb carry a JSON body.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of one protocol operation.
///
/// # Example
///
/// ```
/// use wdwire::catalog::{CommandTemplate, HttpMethod};
///
/// let template = CommandTemplate::new("GetTitle", HttpMethod::Get, "/session/$[session]/title");
/// assert_eq!(template.name(), "GetTitle");
/// assert!(template.route().contains("$[session]"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    name: String,
    method: HttpMethod,
    route: String,
    content_type: String,
}

impl CommandTemplate {
    /// Creates a template using the default JSON content type.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            route: route.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
        }
    }

    /// Replaces the content type sent with bodied requests.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Logical command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP verb.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Route pattern, possibly containing `$[name]` placeholders.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Content type for bodied requests.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// A provider of additional command templates.
///
/// Collaborators implement this to contribute vendor-specific routes
/// (for example browser extension or context commands) to a session's
/// catalog before it touches the network.
pub trait CommandSource {
    /// Templates to register, in registration order.
    fn commands(&self) -> Vec<CommandTemplate>;
}

impl CommandSource for Vec<CommandTemplate> {
    fn commands(&self) -> Vec<CommandTemplate> {
        self.clone()
    }
}

/// Name-keyed set of command templates.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    templates: HashMap<String, CommandTemplate>,
}

impl CommandCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the standard W3C command table.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for &(name, method, route) in standard::STANDARD_COMMANDS {
            catalog.register(CommandTemplate::new(name, method, route));
        }
        catalog
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::NotSupported`] when no template is registered
    /// under `name`.
    pub fn lookup(&self, name: &str) -> Result<&CommandTemplate, WebDriverError> {
        self.templates
            .get(name)
            .ok_or_else(|| WebDriverError::NotSupported {
                name: name.to_owned(),
            })
    }

    /// Registers a template, replacing any previous entry with the same name.
    ///
    /// Returns the replaced template, if any.
    pub fn register(&mut self, template: CommandTemplate) -> Option<CommandTemplate> {
        self.templates.insert(template.name().to_owned(), template)
    }

    /// Registers every template a source declares, in order.
    pub fn extend_from(&mut self, source: &dyn CommandSource) {
        for template in source.commands() {
            self.register(template);
        }
    }

    /// Removes a template by name, returning it when it was present.
    pub fn remove(&mut self, name: &str) -> Option<CommandTemplate> {
        self.templates.remove(name)
    }

    /// Whether a template is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Iterates the registered templates sorted by name.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &CommandTemplate> {
        let mut templates: Vec<&CommandTemplate> = self.templates.values().collect();
        templates.sort_by(|left, right| left.name().cmp(right.name()));
        templates.into_iter()
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
