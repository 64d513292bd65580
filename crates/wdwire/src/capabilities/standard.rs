//! Standard W3C capabilities and their wire schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When the remote end considers a navigation complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLoadStrategy {
    /// Wait for the full page load.
    #[default]
    Normal,
    /// Wait for `DOMContentLoaded`.
    Eager,
    /// Return as soon as the navigation starts.
    None,
}

/// How the remote end treats user prompts it did not expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnhandledPromptBehavior {
    /// Dismiss the prompt.
    #[serde(rename = "dismiss")]
    Dismiss,
    /// Accept the prompt.
    #[serde(rename = "accept")]
    Accept,
    /// Dismiss the prompt and report it.
    #[serde(rename = "dismiss and notify")]
    DismissAndNotify,
    /// Accept the prompt and report it.
    #[serde(rename = "accept and notify")]
    AcceptAndNotify,
    /// Leave the prompt open.
    #[serde(rename = "ignore")]
    Ignore,
}

/// Session timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    /// Script evaluation timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<u64>,
    /// Navigation timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_load: Option<u64>,
    /// Implicit element lookup wait.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
}

/// Proxy configuration forwarded verbatim to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    /// `direct`, `manual`, `pac`, `autodetect` or `system`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_type: Option<String>,
    /// PAC file URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_autoconfig_url: Option<String>,
    /// HTTP proxy `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    /// TLS proxy `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_proxy: Option<String>,
    /// SOCKS proxy `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_proxy: Option<String>,
    /// SOCKS protocol version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_version: Option<u8>,
    /// Hosts that bypass the proxy.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_proxy: Vec<String>,
}

/// Strongly typed standard capabilities.
///
/// Each field maps to exactly one wire name through [`SCHEMA`]. Fields left at
/// their default are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StandardCapabilities {
    /// `browserName`
    pub browser_name: Option<String>,
    /// `browserVersion`
    pub browser_version: Option<String>,
    /// `platformName`
    pub platform_name: Option<String>,
    /// `acceptInsecureCerts`
    pub accept_insecure_certs: bool,
    /// `pageLoadStrategy`
    pub page_load_strategy: Option<PageLoadStrategy>,
    /// `proxy`
    pub proxy: Option<Proxy>,
    /// `setWindowRect`
    pub set_window_rect: bool,
    /// `strictFileInteractability`
    pub strict_file_interactability: bool,
    /// `timeouts`
    pub timeouts: Option<Timeouts>,
    /// `unhandledPromptBehavior`
    pub unhandled_prompt_behavior: Option<UnhandledPromptBehavior>,
    /// `webSocketUrl`
    pub web_socket_url: bool,
}

/// One row of the standard capability schema.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityField {
    /// Wire name of the capability.
    pub wire_name: &'static str,
    /// Reads the wire value; `null` when unset.
    pub accessor: fn(&StandardCapabilities) -> Value,
    /// Value the remote end assumes when the capability is absent.
    pub default: fn() -> Value,
}

fn to_wire<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

const fn no_default() -> Value {
    Value::Null
}

const fn false_default() -> Value {
    Value::Bool(false)
}

/// The standard capability schema, in wire order.
pub static SCHEMA: &[CapabilityField] = &[
    CapabilityField {
        wire_name: "browserName",
        accessor: |caps| to_wire(&caps.browser_name),
        default: no_default,
    },
    CapabilityField {
        wire_name: "browserVersion",
        accessor: |caps| to_wire(&caps.browser_version),
        default: no_default,
    },
    CapabilityField {
        wire_name: "platformName",
        accessor: |caps| to_wire(&caps.platform_name),
        default: no_default,
    },
    CapabilityField {
        wire_name: "acceptInsecureCerts",
        accessor: |caps| Value::Bool(caps.accept_insecure_certs),
        default: false_default,
    },
    CapabilityField {
        wire_name: "pageLoadStrategy",
        accessor: |caps| to_wire(&caps.page_load_strategy),
        default: || to_wire(&PageLoadStrategy::Normal),
    },
    CapabilityField {
        wire_name: "proxy",
        accessor: |caps| to_wire(&caps.proxy),
        default: no_default,
    },
    CapabilityField {
        wire_name: "setWindowRect",
        accessor: |caps| Value::Bool(caps.set_window_rect),
        default: false_default,
    },
    CapabilityField {
        wire_name: "strictFileInteractability",
        accessor: |caps| Value::Bool(caps.strict_file_interactability),
        default: false_default,
    },
    CapabilityField {
        wire_name: "timeouts",
        accessor: |caps| to_wire(&caps.timeouts),
        default: no_default,
    },
    CapabilityField {
        wire_name: "unhandledPromptBehavior",
        accessor: |caps| to_wire(&caps.unhandled_prompt_behavior),
        default: no_default,
    },
    CapabilityField {
        wire_name: "webSocketUrl",
        accessor: |caps| Value::Bool(caps.web_socket_url),
        default: false_default,
    },
];

/// Whether a wire value should be left out of the negotiated capabilities.
///
/// Nulls, values equal to the field default and empty mappings are skipped.
#[must_use]
pub fn is_default(value: &Value, default: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) if map.is_empty() => true,
        other => other == default,
    }
}
