//! Local driver process management.
//!
//! A [`DriverService`] launches a driver executable (geckodriver,
//! chromedriver and friends) on a local port, polls its `/status` endpoint
//! until it reports ready, and kills it on [`DriverService::stop`] or drop.

use std::io;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command as Process, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{CommandCatalog, STATUS};
use crate::command::Command;
use crate::invoker::CommandInvoker;
use crate::response::decode_value;
use crate::transport::Transport;

pub(crate) const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(20);

/// Failures while managing a local driver process.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The executable could not be spawned.
    #[error("failed to spawn driver '{}': {source}", .executable.display())]
    Launch {
        /// Path that was executed.
        executable: PathBuf,
        /// Underlying spawn error.
        #[source]
        source: Arc<io::Error>,
    },
    /// No free local port could be reserved.
    #[error("failed to reserve a local port for the driver: {source}")]
    ReservePort {
        /// Underlying socket error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The driver exited before it reported ready.
    #[error("driver exited before reporting ready (status: {exit_status:?})")]
    StartupFailed {
        /// Exit code, when the process exited normally.
        exit_status: Option<i32>,
    },
    /// The driver did not report ready before the deadline.
    #[error("timed out waiting for driver at {url} to report ready after {timeout_ms} ms")]
    StartupTimeout {
        /// Status endpoint base URL.
        url: String,
        /// Deadline that elapsed.
        timeout_ms: u64,
    },
    /// The driver process state could not be queried.
    #[error("failed to monitor driver process: {source}")]
    Monitor {
        /// Underlying error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The driver address does not form a usable URL.
    #[error("driver address '{url}' is not a valid url")]
    InvalidAddress {
        /// Offending address.
        url: String,
    },
    /// An operation needed a running driver.
    #[error("driver service has not been started")]
    NotStarted,
}

/// Readiness report from `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerStatus {
    /// Whether the remote end accepts new sessions.
    #[serde(default)]
    pub ready: bool,
    /// Free-form explanation.
    #[serde(default)]
    pub message: String,
}

/// Descriptor and handle of a local driver process.
#[derive(Debug)]
pub struct DriverService {
    binaries_dir: Option<PathBuf>,
    executable: String,
    args: Vec<String>,
    host: String,
    port: Option<u16>,
    startup_timeout: Duration,
    child: Option<Child>,
}

impl DriverService {
    /// Describes a driver found on `PATH` under `executable`.
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            binaries_dir: None,
            executable: executable.into(),
            args: Vec::new(),
            host: DEFAULT_HOST.to_owned(),
            port: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            child: None,
        }
    }

    /// Looks the executable up in `dir` instead of `PATH`.
    #[must_use]
    pub fn with_binaries_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binaries_dir = Some(dir.into());
        self
    }

    /// Appends a launch argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the host the driver is reached on.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Fixes the port; an ephemeral port is reserved otherwise.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the readiness deadline.
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Replaces the readiness deadline in place.
    pub const fn set_startup_timeout(&mut self, timeout: Duration) {
        self.startup_timeout = timeout;
    }

    /// Path that [`Self::start`] executes.
    #[must_use]
    pub fn executable_path(&self) -> PathBuf {
        self.binaries_dir.as_ref().map_or_else(
            || PathBuf::from(&self.executable),
            |dir| dir.join(&self.executable),
        )
    }

    /// Port the driver listens on, once chosen.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Base URL of the driver, once a port is chosen.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.port.map(|port| format!("http://{}:{port}", self.host))
    }

    /// Whether a child process is held and has not exited.
    pub fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Spawns the driver.
    ///
    /// The caller arguments are passed first, followed by `--port=<port>`.
    /// Starting a running service does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ReservePort`] when no port can be reserved and
    /// [`ServiceError::Launch`] when the executable cannot be spawned.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.is_running() {
            return Ok(());
        }
        let port = match self.port {
            Some(port) => port,
            None => reserve_port()?,
        };
        self.port = Some(port);

        let executable = self.executable_path();
        let mut process = Process::new(&executable);
        process
            .args(&self.args)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        info!(
            target: SERVICE_TARGET,
            executable = %executable.display(),
            port,
            "starting driver service"
        );
        let child = process.spawn().map_err(|source| ServiceError::Launch {
            executable,
            source: Arc::new(source),
        })?;
        self.child = Some(child);
        Ok(())
    }

    /// Polls `GET /status` every 200 ms until the driver reports ready.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotStarted`] before [`Self::start`],
    /// [`ServiceError::StartupFailed`] when the process exits first and
    /// [`ServiceError::StartupTimeout`] when the deadline passes.
    pub fn wait_until_ready(
        &mut self,
        transport: Arc<dyn Transport>,
    ) -> Result<ServerStatus, ServiceError> {
        let url = self.url().ok_or(ServiceError::NotStarted)?;
        let invoker = CommandInvoker::new(&url, PROBE_TIMEOUT, false, transport)
            .map_err(|_| ServiceError::InvalidAddress { url: url.clone() })?;
        let catalog = CommandCatalog::standard();
        let template = catalog
            .lookup(STATUS)
            .map_err(|_| ServiceError::InvalidAddress { url: url.clone() })?;
        let status_command = Command::new(template);
        let deadline = Instant::now() + self.startup_timeout;

        while Instant::now() < deadline {
            let child = self.child.as_mut().ok_or(ServiceError::NotStarted)?;
            if let Some(status) = child.try_wait().map_err(|source| ServiceError::Monitor {
                source: Arc::new(source),
            })? {
                self.child = None;
                return Err(ServiceError::StartupFailed {
                    exit_status: status.code(),
                });
            }

            match invoker
                .execute(&status_command)
                .and_then(decode_value::<ServerStatus>)
            {
                Ok(status) if status.ready => {
                    info!(target: SERVICE_TARGET, %url, "driver service ready");
                    return Ok(status);
                }
                Ok(status) => {
                    debug!(target: SERVICE_TARGET, message = %status.message, "driver not ready yet");
                }
                Err(error) => {
                    debug!(target: SERVICE_TARGET, %error, "driver status check failed");
                }
            }
            thread::sleep(POLL_INTERVAL);
        }

        Err(ServiceError::StartupTimeout {
            url,
            timeout_ms: u64::try_from(self.startup_timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Kills and reaps the driver. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(error) = child.kill() {
            // Already exited; reaping below still applies.
            debug!(target: SERVICE_TARGET, %error, "driver kill failed");
        }
        match child.wait() {
            Ok(status) => info!(target: SERVICE_TARGET, ?status, "driver service stopped"),
            Err(error) => warn!(target: SERVICE_TARGET, %error, "failed to reap driver process"),
        }
    }
}

impl Drop for DriverService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reserve_port() -> Result<u16, ServiceError> {
    let listener = TcpListener::bind((DEFAULT_HOST, 0)).map_err(|source| {
        ServiceError::ReservePort {
            source: Arc::new(source),
        }
    })?;
    let port = listener
        .local_addr()
        .map_err(|source| ServiceError::ReservePort {
            source: Arc::new(source),
        })?
        .port();
    Ok(port)
}

#[cfg(test)]
mod tests;
