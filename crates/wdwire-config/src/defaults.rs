use crate::logging::LogFormat;

/// Remote end used when no URL is configured (a local Selenium-style hub).
pub const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:4444";

/// Default per-command HTTP timeout in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 60_000;

/// Default readiness deadline for a managed driver service in milliseconds.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 20_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned remote URL used where allocation is required (e.g. serde).
pub fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_owned()
}

/// Default per-command timeout.
pub const fn default_command_timeout_ms() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

/// Default service startup timeout.
pub const fn default_startup_timeout_ms() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_MS
}

/// Connections are reused unless the caller opts out.
pub const fn default_keep_alive() -> bool {
    true
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
