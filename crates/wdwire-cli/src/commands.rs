//! Execution of the `wdwire` subcommands against a remote end.

use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use wdwire::catalog::STATUS;
use wdwire::invoker::CommandInvoker;
use wdwire::{
    BrowserOptions, ChromiumOptions, Command, CommandCatalog, FirefoxOptions, ReqwestTransport,
    SessionBuilder, SessionId, Transport, WebDriverError,
};
use wdwire_config::Config;

use crate::AppError;
use crate::cli::{Browser, CliCommand};

pub(crate) const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Shared inputs of every subcommand.
pub(crate) struct CommandContext<'a> {
    pub(crate) config: &'a Config,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

impl CommandContext<'_> {
    fn transport(&self) -> Result<Arc<dyn Transport>, AppError> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => {
                let transport = ReqwestTransport::new().map_err(|failure| {
                    WebDriverError::Connection {
                        message: failure.to_string(),
                    }
                })?;
                Ok(Arc::new(transport))
            }
        }
    }

    fn builder(&self) -> Result<SessionBuilder, AppError> {
        Ok(SessionBuilder::from_config(self.config).transport(self.transport()?))
    }
}

pub(crate) fn execute<W: Write>(
    command: CliCommand,
    context: &CommandContext<'_>,
    stdout: &mut W,
) -> Result<(), AppError> {
    debug!(target: CLI_TARGET, ?command, "executing subcommand");
    match command {
        CliCommand::Status => status(context, stdout),
        CliCommand::Commands => list_commands(stdout),
        CliCommand::NewSession {
            browser,
            accept_insecure_certs,
            headless,
        } => {
            let options = browser_options(browser, accept_insecure_certs, headless);
            let session = context.builder()?.options(options.as_ref()).build()?;
            match session.detach() {
                Some(id) => writeln!(stdout, "{id}").map_err(AppError::WriteOutput),
                None => Ok(()),
            }
        }
        CliCommand::Invoke {
            name,
            session,
            element,
            params,
            payload,
        } => {
            let session = context.builder()?.attach(SessionId::new(session)).build()?;
            let mut command = session.new_command(&name)?;
            if let Some(element) = element {
                command = command.with_element(element);
            }
            for (param, value) in params {
                command = command.with_parameter(param, value);
            }
            if let Some(raw) = payload {
                let payload = serde_json::from_str(&raw).map_err(AppError::InvalidPayload)?;
                command = command.with_payload(payload);
            }
            let value = session.execute(&command)?;
            write_value(stdout, &value)
        }
        CliCommand::Quit { session } => {
            let mut session = context.builder()?.attach(SessionId::new(session)).build()?;
            session.quit()?;
            Ok(())
        }
    }
}

fn status<W: Write>(context: &CommandContext<'_>, stdout: &mut W) -> Result<(), AppError> {
    let config = context.config;
    let invoker = CommandInvoker::new(
        config.remote_url(),
        config.command_timeout(),
        config.keep_alive(),
        context.transport()?,
    )?;
    let catalog = CommandCatalog::standard();
    let value = invoker.execute(&Command::new(catalog.lookup(STATUS)?))?;
    write_value(stdout, &value)
}

fn list_commands<W: Write>(stdout: &mut W) -> Result<(), AppError> {
    let catalog = CommandCatalog::standard();
    for template in catalog.iter_sorted() {
        writeln!(
            stdout,
            "{} {} {}",
            template.name(),
            template.method().as_str(),
            template.route()
        )
        .map_err(AppError::WriteOutput)?;
    }
    Ok(())
}

fn browser_options(
    browser: Browser,
    accept_insecure_certs: bool,
    headless: bool,
) -> Box<dyn BrowserOptions> {
    match browser {
        Browser::Firefox => {
            let mut options = FirefoxOptions::new();
            options.standard_mut().accept_insecure_certs = accept_insecure_certs;
            if headless {
                options.headless();
            }
            Box::new(options)
        }
        Browser::Chrome | Browser::Edge => {
            let mut options = if browser == Browser::Edge {
                ChromiumOptions::edge()
            } else {
                ChromiumOptions::chrome()
            };
            options.standard_mut().accept_insecure_certs = accept_insecure_certs;
            if headless {
                options.headless();
            }
            Box::new(options)
        }
    }
}

fn write_value<W: Write>(stdout: &mut W, value: &Value) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *stdout, value).map_err(AppError::SerialiseOutput)?;
    writeln!(stdout).map_err(AppError::WriteOutput)?;
    stdout.flush().map_err(AppError::WriteOutput)
}
