//! Vendor-prefixed option buckets and the shipped browser options.

use serde_json::{Map, Value, json};

use super::standard::StandardCapabilities;

/// One vendor-specific option with the value the browser assumes by default.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorEntry {
    /// Key inside the vendor bucket.
    pub name: String,
    /// Current value.
    pub value: Value,
    /// Value treated as unset.
    pub default: Value,
}

impl VendorEntry {
    /// Creates an entry whose default is `null`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            default: Value::Null,
        }
    }

    /// Replaces the default.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// A vendor bucket: one capability key holding browser-specific settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorBucket {
    key: String,
    entries: Vec<VendorEntry>,
}

impl VendorBucket {
    /// Creates a bucket keyed by `prefix + options_key`.
    #[must_use]
    pub fn new(prefix: &str, options_key: &str, entries: Vec<VendorEntry>) -> Self {
        Self {
            key: format!("{prefix}{options_key}"),
            entries,
        }
    }

    /// Capability key of the bucket, for example `moz:firefoxOptions`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[VendorEntry] {
        &self.entries
    }
}

/// A capability-bearing options object supplied by a browser integration.
pub trait BrowserOptions {
    /// Standard W3C capabilities.
    fn standard(&self) -> &StandardCapabilities;

    /// Vendor prefix including the trailing colon, for example `moz:`.
    fn vendor_prefix(&self) -> &str;

    /// Name of the vendor options key, for example `firefoxOptions`.
    fn options_key(&self) -> &str;

    /// Typed vendor options.
    fn vendor_entries(&self) -> Vec<VendorEntry>;

    /// Free-form capabilities merged into AlwaysMatch last.
    fn extra_capabilities(&self) -> &Map<String, Value>;

    /// Free-form entries merged into the vendor bucket last.
    fn extra_options(&self) -> &Map<String, Value>;

    /// Builds the vendor bucket from the prefix, key and typed entries.
    fn vendor_bucket(&self) -> VendorBucket {
        VendorBucket::new(self.vendor_prefix(), self.options_key(), self.vendor_entries())
    }

    /// Negotiates the capabilities for a new session.
    fn to_capabilities(&self) -> super::Capabilities {
        super::negotiate(
            self.standard(),
            &self.vendor_bucket(),
            self.extra_capabilities(),
            self.extra_options(),
        )
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn optional_string(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |text| Value::String(text.clone()))
}

/// Options for Firefox via geckodriver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirefoxOptions {
    standard: StandardCapabilities,
    binary: Option<String>,
    args: Vec<String>,
    prefs: Map<String, Value>,
    profile: Option<String>,
    log_level: Option<String>,
    extra_capabilities: Map<String, Value>,
    extra_options: Map<String, Value>,
}

impl FirefoxOptions {
    /// Creates options with `browserName` set to `firefox`.
    #[must_use]
    pub fn new() -> Self {
        let mut options = Self::default();
        options.standard.browser_name = Some(String::from("firefox"));
        options
    }

    /// Mutable access to the standard capabilities.
    pub const fn standard_mut(&mut self) -> &mut StandardCapabilities {
        &mut self.standard
    }

    /// Sets the Firefox binary path.
    pub fn set_binary(&mut self, binary: impl Into<String>) {
        self.binary = Some(binary.into());
    }

    /// Adds a command-line argument.
    pub fn add_argument(&mut self, argument: impl Into<String>) {
        self.args.push(argument.into());
    }

    /// Runs the browser without a visible window.
    pub fn headless(&mut self) {
        self.add_argument("-headless");
    }

    /// Sets a `about:config` preference.
    pub fn set_preference(&mut self, name: impl Into<String>, value: Value) {
        self.prefs.insert(name.into(), value);
    }

    /// Sets a base64-encoded zipped profile.
    pub fn set_profile(&mut self, profile: impl Into<String>) {
        self.profile = Some(profile.into());
    }

    /// Sets the geckodriver log level, for example `trace`.
    pub fn set_log_level(&mut self, level: impl Into<String>) {
        self.log_level = Some(level.into());
    }

    /// Adds a free-form capability.
    pub fn add_capability(&mut self, name: impl Into<String>, value: Value) {
        self.extra_capabilities.insert(name.into(), value);
    }

    /// Adds a free-form entry to `moz:firefoxOptions`.
    pub fn add_option(&mut self, name: impl Into<String>, value: Value) {
        self.extra_options.insert(name.into(), value);
    }
}

impl BrowserOptions for FirefoxOptions {
    fn standard(&self) -> &StandardCapabilities {
        &self.standard
    }

    fn vendor_prefix(&self) -> &str {
        "moz:"
    }

    fn options_key(&self) -> &str {
        "firefoxOptions"
    }

    fn vendor_entries(&self) -> Vec<VendorEntry> {
        let log = self
            .log_level
            .as_ref()
            .map_or(Value::Null, |level| json!({ "level": level }));
        vec![
            VendorEntry::new("binary", optional_string(self.binary.as_ref())),
            VendorEntry::new("args", string_list(&self.args)).with_default(json!([])),
            VendorEntry::new("prefs", Value::Object(self.prefs.clone())),
            VendorEntry::new("profile", optional_string(self.profile.as_ref())),
            VendorEntry::new("log", log),
        ]
    }

    fn extra_capabilities(&self) -> &Map<String, Value> {
        &self.extra_capabilities
    }

    fn extra_options(&self) -> &Map<String, Value> {
        &self.extra_options
    }
}

/// Options for Chromium-based browsers (Chrome and Edge).
#[derive(Debug, Clone, PartialEq)]
pub struct ChromiumOptions {
    standard: StandardCapabilities,
    vendor_prefix: String,
    options_key: String,
    binary: Option<String>,
    args: Vec<String>,
    extensions: Vec<String>,
    prefs: Map<String, Value>,
    debugger_address: Option<String>,
    detach: bool,
    exclude_switches: Vec<String>,
    extra_capabilities: Map<String, Value>,
    extra_options: Map<String, Value>,
}

impl ChromiumOptions {
    fn with_vendor(browser_name: &str, vendor_prefix: &str, options_key: &str) -> Self {
        let standard = StandardCapabilities {
            browser_name: Some(browser_name.to_owned()),
            ..StandardCapabilities::default()
        };
        Self {
            standard,
            vendor_prefix: vendor_prefix.to_owned(),
            options_key: options_key.to_owned(),
            binary: None,
            args: Vec::new(),
            extensions: Vec::new(),
            prefs: Map::new(),
            debugger_address: None,
            detach: false,
            exclude_switches: Vec::new(),
            extra_capabilities: Map::new(),
            extra_options: Map::new(),
        }
    }

    /// Options for Google Chrome (`goog:chromeOptions`).
    #[must_use]
    pub fn chrome() -> Self {
        Self::with_vendor("chrome", "goog:", "chromeOptions")
    }

    /// Options for Microsoft Edge (`ms:edgeOptions`).
    #[must_use]
    pub fn edge() -> Self {
        Self::with_vendor("MicrosoftEdge", "ms:", "edgeOptions")
    }

    /// Mutable access to the standard capabilities.
    pub const fn standard_mut(&mut self) -> &mut StandardCapabilities {
        &mut self.standard
    }

    /// Sets the browser binary path.
    pub fn set_binary(&mut self, binary: impl Into<String>) {
        self.binary = Some(binary.into());
    }

    /// Adds a command-line switch.
    pub fn add_argument(&mut self, argument: impl Into<String>) {
        self.args.push(argument.into());
    }

    /// Runs the browser without a visible window.
    pub fn headless(&mut self) {
        self.add_argument("--headless=new");
    }

    /// Adds a base64-encoded packed extension.
    pub fn add_extension(&mut self, extension: impl Into<String>) {
        self.extensions.push(extension.into());
    }

    /// Sets a user preference.
    pub fn set_preference(&mut self, name: impl Into<String>, value: Value) {
        self.prefs.insert(name.into(), value);
    }

    /// Attaches to an already running browser at `host:port`.
    pub fn set_debugger_address(&mut self, address: impl Into<String>) {
        self.debugger_address = Some(address.into());
    }

    /// Keeps the browser open after the driver exits.
    pub const fn set_detach(&mut self, detach: bool) {
        self.detach = detach;
    }

    /// Removes a default switch the driver would otherwise pass.
    pub fn exclude_switch(&mut self, switch: impl Into<String>) {
        self.exclude_switches.push(switch.into());
    }

    /// Adds a free-form capability.
    pub fn add_capability(&mut self, name: impl Into<String>, value: Value) {
        self.extra_capabilities.insert(name.into(), value);
    }

    /// Adds a free-form entry to the vendor bucket.
    pub fn add_option(&mut self, name: impl Into<String>, value: Value) {
        self.extra_options.insert(name.into(), value);
    }
}

impl BrowserOptions for ChromiumOptions {
    fn standard(&self) -> &StandardCapabilities {
        &self.standard
    }

    fn vendor_prefix(&self) -> &str {
        &self.vendor_prefix
    }

    fn options_key(&self) -> &str {
        &self.options_key
    }

    fn vendor_entries(&self) -> Vec<VendorEntry> {
        vec![
            VendorEntry::new("binary", optional_string(self.binary.as_ref())),
            VendorEntry::new("args", string_list(&self.args)).with_default(json!([])),
            VendorEntry::new("extensions", string_list(&self.extensions))
                .with_default(json!([])),
            VendorEntry::new("prefs", Value::Object(self.prefs.clone())),
            VendorEntry::new(
                "debuggerAddress",
                optional_string(self.debugger_address.as_ref()),
            ),
            VendorEntry::new("detach", Value::Bool(self.detach)).with_default(json!(false)),
            VendorEntry::new("excludeSwitches", string_list(&self.exclude_switches))
                .with_default(json!([])),
        ]
    }

    fn extra_capabilities(&self) -> &Map<String, Value> {
        &self.extra_capabilities
    }

    fn extra_options(&self) -> &Map<String, Value> {
        &self.extra_options
    }
}
