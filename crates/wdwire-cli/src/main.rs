//! CLI entrypoint for the wdwire WebDriver client.
//!
//! The binary delegates to [`wdwire_cli::run`], which loads configuration,
//! installs telemetry and runs one wire command against the remote end.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    wdwire_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
