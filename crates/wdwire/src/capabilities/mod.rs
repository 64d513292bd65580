//! Capability negotiation.
//!
//! Typed option objects are flattened into the two-part AlwaysMatch /
//! FirstMatch structure the protocol expects. Standard capabilities go
//! straight into AlwaysMatch; vendor options are collected into a single
//! `prefix + options_key` bucket. Values left at their default are omitted, and
//! caller-supplied free-form entries are merged last so they win on collision.
//!
//! ```
//! use wdwire::capabilities::{BrowserOptions, FirefoxOptions, SessionRequest};
//!
//! let mut options = FirefoxOptions::new();
//! options.standard_mut().accept_insecure_certs = true;
//! let request = SessionRequest::new(options.to_capabilities());
//! assert_eq!(request.capabilities().first_match().len(), 1);
//! assert!(!request.capabilities().always_match().contains_key("browserName"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod standard;
mod vendor;

pub use standard::{
    CapabilityField, PageLoadStrategy, Proxy, SCHEMA, StandardCapabilities, Timeouts,
    UnhandledPromptBehavior, is_default,
};
pub use vendor::{BrowserOptions, ChromiumOptions, FirefoxOptions, VendorBucket, VendorEntry};

const BROWSER_NAME: &str = "browserName";

/// Negotiated capability structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default)]
    always_match: Map<String, Value>,
    #[serde(default)]
    first_match: Vec<Map<String, Value>>,
}

impl Capabilities {
    /// Builds capabilities from explicit parts.
    #[must_use]
    pub const fn new(always_match: Map<String, Value>, first_match: Vec<Map<String, Value>>) -> Self {
        Self {
            always_match,
            first_match,
        }
    }

    /// Entries every accepted session must satisfy.
    #[must_use]
    pub const fn always_match(&self) -> &Map<String, Value> {
        &self.always_match
    }

    /// Alternative branches tried in order.
    #[must_use]
    pub fn first_match(&self) -> &[Map<String, Value>] {
        &self.first_match
    }

    /// Appends a FirstMatch branch.
    pub fn push_first_match(&mut self, branch: Map<String, Value>) {
        self.first_match.push(branch);
    }
}

/// Flattens typed and free-form options into [`Capabilities`].
///
/// Standard fields are emitted through [`SCHEMA`] unless they are at their
/// default. Vendor entries form the bucket named by [`VendorBucket::key`],
/// with `extra_options` merged over them; the bucket is omitted when empty.
/// `extra_capabilities` are merged into AlwaysMatch last.
#[must_use]
pub fn negotiate(
    known: &StandardCapabilities,
    vendor: &VendorBucket,
    extra_capabilities: &Map<String, Value>,
    extra_options: &Map<String, Value>,
) -> Capabilities {
    let mut always_match = Map::new();
    for field in SCHEMA {
        let value = (field.accessor)(known);
        if !is_default(&value, &(field.default)()) {
            always_match.insert(field.wire_name.to_owned(), value);
        }
    }

    let mut bucket = Map::new();
    for entry in vendor.entries() {
        if !is_default(&entry.value, &entry.default) {
            bucket.insert(entry.name.clone(), entry.value.clone());
        }
    }
    bucket.extend(extra_options.clone());
    if !bucket.is_empty() && !vendor.key().is_empty() {
        always_match.insert(vendor.key().to_owned(), Value::Object(bucket));
    }

    always_match.extend(extra_capabilities.clone());
    Capabilities::new(always_match, Vec::new())
}

/// Payload of the `NewSession` command.
///
/// Serialises as `{"capabilities": {...}, "desiredCapabilities": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    capabilities: Capabilities,
    desired_capabilities: Map<String, Value>,
    #[serde(skip)]
    start_new_session: bool,
}

impl SessionRequest {
    /// Prepares negotiated capabilities for session creation.
    ///
    /// When FirstMatch is empty, `browserName` moves out of AlwaysMatch into a
    /// single synthesised branch (an empty string when it was absent). A
    /// non-empty FirstMatch is kept as supplied. The legacy desired
    /// capabilities are folded from AlwaysMatch and then each branch in order.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        let mut capabilities = capabilities;
        if capabilities.first_match.is_empty() {
            let browser = capabilities
                .always_match
                .remove(BROWSER_NAME)
                .unwrap_or_else(|| Value::String(String::new()));
            let mut branch = Map::new();
            branch.insert(BROWSER_NAME.to_owned(), browser);
            capabilities.first_match.push(branch);
        }

        let mut desired = capabilities.always_match.clone();
        for branch in &capabilities.first_match {
            desired.extend(branch.clone());
        }

        Self {
            capabilities,
            desired_capabilities: desired,
            start_new_session: true,
        }
    }

    /// Marks the request as attaching to an existing session instead.
    #[must_use]
    pub const fn attach_existing(mut self) -> Self {
        self.start_new_session = false;
        self
    }

    /// Negotiated capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Legacy flat capabilities derived from [`Self::capabilities`].
    #[must_use]
    pub const fn desired_capabilities(&self) -> &Map<String, Value> {
        &self.desired_capabilities
    }

    /// Whether the lifecycle manager should create a new session.
    #[must_use]
    pub const fn start_new_session(&self) -> bool {
        self.start_new_session
    }
}

#[cfg(test)]
mod tests;
