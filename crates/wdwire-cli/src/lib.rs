//! Command-line runtime for the wdwire WebDriver client.
//!
//! The runtime splits configuration flags from the subcommand, loads layered
//! configuration, installs telemetry and runs one wire command. It writes to
//! injected streams and accepts a substitute transport so tests can drive it
//! without a terminal or a browser.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use wdwire::Transport;

mod cli;
mod commands;
mod config;
mod errors;
pub mod telemetry;

use cli::Cli;
use commands::CommandContext;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::split_config_arguments;
pub(crate) use errors::AppError;

/// Bundles the output streams handed to the runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Returns [`ExitCode::SUCCESS`] when the command completed and
/// [`ExitCode::FAILURE`] otherwise, with the error written to `stderr`.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader, None)
}

/// Runs the CLI with a custom configuration loader and transport.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
    transport: Option<Arc<dyn Transport>>,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(&split.command_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            let config = loader.load(&split.config_arguments)?;
            config.parsed_remote_url()?;
            telemetry::initialise(&config)?;
            let context = CommandContext {
                config: &config,
                transport,
            };
            commands::execute(cli.command, &context, &mut *io.stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            // --help and --version are successful requests.
            emit(&mut *io.stdout, &error.render());
            ExitCode::SUCCESS
        }
        Err(error) => {
            emit(&mut *io.stderr, &format!("{error}\n"));
            ExitCode::FAILURE
        }
    }
}

fn emit<S: Write>(stream: &mut S, message: &dyn std::fmt::Display) {
    if let Err(error) = write!(stream, "{message}").and_then(|()| stream.flush()) {
        warn!(target: commands::CLI_TARGET, %error, "failed to write to output stream");
    }
}
