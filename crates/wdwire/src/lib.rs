//! Client-side core of the W3C WebDriver wire protocol.
//!
//! `wdwire` turns named commands into HTTP requests against a remote end
//! (geckodriver, chromedriver, a Selenium grid), validates the JSON
//! envelopes that come back, and classifies failures into the standard
//! WebDriver error taxonomy. Browser interaction APIs are out of scope; the
//! crate stops at the wire.
//!
//! # Core types
//!
//! - [`CommandCatalog`] maps command names to HTTP method and route templates
//! - [`Command`] is one call with its placeholders bound
//! - [`Capabilities`] and [`BrowserOptions`] negotiate session capabilities
//! - [`SessionBuilder`] and [`RemoteSession`] own the session lifecycle
//! - [`DriverService`] launches and polls a local driver executable
//! - [`WebDriverError`] and [`ErrorKind`] classify every failure
//!
//! # Example
//!
//! ```
//! use wdwire::{SessionBuilder, SessionId};
//!
//! // Attaching to an existing session performs no network call.
//! let session = SessionBuilder::new()
//!     .server_url("http://localhost:4444")
//!     .attach(SessionId::new("abc"))
//!     .build()?;
//! let command = session.new_command("GetTitle")?;
//! assert_eq!(command.resolve_route(), "/session/abc/title");
//! # Ok::<(), wdwire::WebDriverError>(())
//! ```

pub mod capabilities;
pub mod catalog;
pub mod command;
pub mod element;
pub mod error;
pub mod invoker;
pub mod response;
pub mod service;
pub mod session;
pub mod transport;

pub use capabilities::{
    BrowserOptions, Capabilities, ChromiumOptions, FirefoxOptions, SessionRequest,
    StandardCapabilities,
};
pub use catalog::{CommandCatalog, CommandSource, CommandTemplate, HttpMethod};
pub use command::{Command, SessionId};
pub use element::{ElementRef, ShadowRootRef};
pub use error::{ErrorGroup, ErrorKind, RemoteError, WebDriverError};
pub use service::{DriverService, ServerStatus, ServiceError};
pub use session::{RemoteSession, SessionBuilder, SessionState};
pub use transport::{ReqwestTransport, Transport};
pub use wdwire_config::Config;

#[cfg(test)]
mod tests;
