//! Session lifecycle management.
//!
//! [`SessionBuilder`] orchestrates the optional local driver bootstrap and
//! session creation; [`RemoteSession`] is the collaborator-facing handle that
//! invokes catalog commands and tears the session down exactly once.
//!
//! ```text
//! Unstarted -> ServiceStarting -> AwaitingReady -> SessionRequested -> Active -> TornDown
//! ```
//!
//! The service states are skipped when a server URL is given, and attaching
//! to an existing session goes straight to `Active` without touching the
//! network.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wdwire_config::Config;

use crate::capabilities::{BrowserOptions, Capabilities, SessionRequest};
use crate::catalog::{CommandCatalog, CommandSource, CommandTemplate, DELETE_SESSION, NEW_SESSION};
use crate::command::{Command, SessionId};
use crate::error::{ErrorKind, RemoteError, WebDriverError};
use crate::invoker::CommandInvoker;
use crate::response::{self, ResponseEnvelope, decode_value};
use crate::service::{DriverService, ServiceError};
use crate::transport::{ReqwestTransport, Transport};

pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing has happened yet.
    Unstarted,
    /// The managed driver process is being launched.
    ServiceStarting,
    /// Waiting for `/status` to report ready.
    AwaitingReady,
    /// `NewSession` has been sent.
    SessionRequested,
    /// A session id is held and commands may be invoked.
    Active,
    /// The session has been deleted or was never created.
    TornDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unstarted => "unstarted",
            Self::ServiceStarting => "service-starting",
            Self::AwaitingReady => "awaiting-ready",
            Self::SessionRequested => "session-requested",
            Self::Active => "active",
            Self::TornDown => "torn-down",
        };
        f.write_str(label)
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    debug!(target: SESSION_TARGET, from = %state, to = %next, "session state change");
    *state = next;
}

/// Configures and creates a [`RemoteSession`].
pub struct SessionBuilder {
    server_url: String,
    service: Option<DriverService>,
    startup_timeout: Option<Duration>,
    timeout: Duration,
    keep_alive: bool,
    capabilities: Capabilities,
    sources: Vec<Box<dyn CommandSource>>,
    attach: Option<SessionId>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            startup_timeout: None,
            ..Self::from_config(&Config::default())
        }
    }
}

impl SessionBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_url: config.remote_url().to_owned(),
            service: None,
            startup_timeout: Some(config.startup_timeout()),
            timeout: config.command_timeout(),
            keep_alive: config.keep_alive(),
            capabilities: Capabilities::default(),
            sources: Vec::new(),
            attach: None,
            transport: None,
        }
    }

    /// Sets the remote end URL. Ignored when a driver service is supplied.
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Launches and owns a local driver instead of using the server URL.
    #[must_use]
    pub fn driver_service(mut self, service: DriverService) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets whether requests ask for connection reuse.
    #[must_use]
    pub const fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Overrides the managed driver's readiness deadline.
    #[must_use]
    pub const fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = Some(timeout);
        self
    }

    /// Negotiates capabilities from a browser options object.
    #[must_use]
    pub fn options(mut self, options: &dyn BrowserOptions) -> Self {
        self.capabilities = options.to_capabilities();
        self
    }

    /// Uses already negotiated capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Registers extra commands before any network call.
    #[must_use]
    pub fn command_source(mut self, source: impl CommandSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Attaches to an existing session instead of creating one.
    ///
    /// The request returned by [`Self::session_request`] is then marked with
    /// [`SessionRequest::attach_existing`].
    #[must_use]
    pub fn attach(mut self, session: SessionId) -> Self {
        self.attach = Some(session);
        self
    }

    /// The session request [`Self::build`] acts on.
    #[must_use]
    pub fn session_request(&self) -> SessionRequest {
        let request = SessionRequest::new(self.capabilities.clone());
        if self.attach.is_some() {
            request.attach_existing()
        } else {
            request
        }
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Creates or attaches the session.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::Service`] when the managed driver fails to
    /// start, [`ErrorKind::SessionNotCreated`] when the remote end returns no
    /// session id, and any invocation or validation failure of `NewSession`.
    pub fn build(self) -> Result<RemoteSession, WebDriverError> {
        let request = self.session_request();
        let mut state = SessionState::Unstarted;
        let mut catalog = CommandCatalog::standard();
        for source in &self.sources {
            catalog.extend_from(source.as_ref());
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new().map_err(|failure| {
                WebDriverError::Connection {
                    message: failure.to_string(),
                }
            })?),
        };

        if let Some(session) = self.attach.filter(|_| !request.start_new_session()) {
            let invoker =
                CommandInvoker::new(&self.server_url, self.timeout, self.keep_alive, transport)?;
            info!(target: SESSION_TARGET, session = %session, "attached to existing session");
            transition(&mut state, SessionState::Active);
            return Ok(RemoteSession {
                invoker,
                catalog,
                session_id: Some(session),
                capabilities: Map::new(),
                state,
                service: None,
                owned: false,
            });
        }

        let mut service = self.service;
        let server_url = match service.as_mut() {
            Some(service) => {
                if let Some(timeout) = self.startup_timeout {
                    service.set_startup_timeout(timeout);
                }
                transition(&mut state, SessionState::ServiceStarting);
                service.start()?;
                transition(&mut state, SessionState::AwaitingReady);
                service.wait_until_ready(Arc::clone(&transport))?;
                service
                    .url()
                    .ok_or(ServiceError::NotStarted)?
            }
            None => self.server_url,
        };

        let invoker = CommandInvoker::new(&server_url, self.timeout, self.keep_alive, transport)?;
        transition(&mut state, SessionState::SessionRequested);
        let payload = serde_json::to_value(&request).map_err(WebDriverError::SerializePayload)?;
        let command = Command::new(catalog.lookup(NEW_SESSION)?).with_payload(payload);
        let response = invoker.send(&command)?;
        let legacy_id = ResponseEnvelope::parse(&response).and_then(|envelope| envelope.session_id);
        let value = response::validate(&command, response)?;
        let (session_id, capabilities) = read_new_session(&value, legacy_id)?;

        info!(target: SESSION_TARGET, session = %session_id, "session created");
        transition(&mut state, SessionState::Active);
        Ok(RemoteSession {
            invoker,
            catalog,
            session_id: Some(session_id),
            capabilities,
            state,
            service,
            owned: true,
        })
    }
}

// Legacy remote ends put `sessionId` beside `value` rather than inside it.
fn read_new_session(
    value: &Value,
    legacy_id: Option<String>,
) -> Result<(SessionId, Map<String, Value>), WebDriverError> {
    let session_id = value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .filter(|id| !id.is_empty())
        .or_else(|| legacy_id.filter(|id| !id.is_empty()))
        .map(SessionId::new)
        .ok_or_else(|| {
            WebDriverError::Remote(RemoteError::new(
                ErrorKind::SessionNotCreated,
                "new session response did not contain a session id",
            ))
        })?;
    let capabilities = value
        .get("capabilities")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Ok((session_id, capabilities))
}

/// A live WebDriver session.
///
/// Sessions created by [`SessionBuilder::build`] are deleted on drop unless
/// [`Self::quit`] or [`Self::detach`] ran first. Attached sessions are never
/// deleted implicitly.
#[derive(Debug)]
pub struct RemoteSession {
    invoker: CommandInvoker,
    catalog: CommandCatalog,
    session_id: Option<SessionId>,
    capabilities: Map<String, Value>,
    state: SessionState,
    service: Option<DriverService>,
    owned: bool,
}

impl RemoteSession {
    /// Current session id; `None` after teardown.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Capabilities the remote end granted; empty for attached sessions.
    #[must_use]
    pub const fn capabilities(&self) -> &Map<String, Value> {
        &self.capabilities
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Commands available to this session.
    #[must_use]
    pub const fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Creates a command bound to this session.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::NotSupported`] for unknown names.
    pub fn new_command(&self, name: &str) -> Result<Command, WebDriverError> {
        let mut command = Command::new(self.catalog.lookup(name)?);
        command.set_session(self.session_id.clone());
        Ok(command)
    }

    /// Registers or replaces a command.
    pub fn add_command(&mut self, template: CommandTemplate) -> Option<CommandTemplate> {
        self.catalog.register(template)
    }

    /// Removes a command.
    pub fn remove_command(&mut self, name: &str) -> Option<CommandTemplate> {
        self.catalog.remove(name)
    }

    /// Executes a prepared command and returns the raw value.
    ///
    /// # Errors
    ///
    /// Returns every transport and remote failure as a [`WebDriverError`].
    pub fn execute(&self, command: &Command) -> Result<Value, WebDriverError> {
        self.invoker.execute(command)
    }

    /// Executes a prepared command and decodes the value into `T`.
    ///
    /// # Errors
    ///
    /// As [`Self::execute`], plus [`WebDriverError::Decode`].
    pub fn execute_as<T>(&self, command: &Command) -> Result<T, WebDriverError>
    where
        T: DeserializeOwned + Default,
    {
        decode_value(self.execute(command)?)
    }

    /// Invokes a command by name without a payload.
    ///
    /// # Errors
    ///
    /// As [`Self::new_command`] and [`Self::execute`].
    pub fn invoke(&self, name: &str) -> Result<Value, WebDriverError> {
        self.execute(&self.new_command(name)?)
    }

    /// Invokes a command by name with a payload.
    ///
    /// # Errors
    ///
    /// As [`Self::invoke`], plus [`WebDriverError::SerializePayload`].
    pub fn invoke_with<P>(&self, name: &str, payload: &P) -> Result<Value, WebDriverError>
    where
        P: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(payload).map_err(WebDriverError::SerializePayload)?;
        self.execute(&self.new_command(name)?.with_payload(payload))
    }

    /// Deletes the session and stops the managed driver.
    ///
    /// Calling `quit` again after success does nothing. An `invalid session id`
    /// failure from the remote end counts as success.
    ///
    /// # Errors
    ///
    /// Returns any other failure of `DeleteSession`; the session id is kept so
    /// the caller may retry.
    pub fn quit(&mut self) -> Result<(), WebDriverError> {
        if self.session_id.is_some() {
            let command = self.new_command(DELETE_SESSION)?;
            match self.execute(&command) {
                Ok(_) => {}
                Err(error) if error.kind() == Some(ErrorKind::InvalidSessionId) => {
                    debug!(target: SESSION_TARGET, %error, "session already gone");
                }
                Err(error) => return Err(error),
            }
            if let Some(session) = self.session_id.take() {
                info!(target: SESSION_TARGET, session = %session, "session deleted");
            }
        }
        self.stop_service();
        if self.state != SessionState::TornDown {
            transition(&mut self.state, SessionState::TornDown);
        }
        Ok(())
    }

    /// Leaves the remote session running and returns its id.
    ///
    /// The managed driver, if any, is still stopped when the handle drops.
    #[must_use]
    pub fn detach(mut self) -> Option<SessionId> {
        self.owned = false;
        self.session_id.take()
    }

    fn stop_service(&mut self) {
        if let Some(service) = self.service.as_mut() {
            service.stop();
        }
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        if self.owned
            && self.session_id.is_some()
            && let Err(error) = self.quit()
        {
            warn!(target: SESSION_TARGET, %error, "failed to delete session on drop");
        }
        self.stop_service();
    }
}
