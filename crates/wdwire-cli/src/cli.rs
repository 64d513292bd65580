//! CLI argument definitions for the `wdwire` binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface for the wdwire WebDriver client.
#[derive(Parser, Debug)]
#[command(name = "wdwire", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The wire operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Browser families `new-session` can negotiate for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum Browser {
    /// Mozilla Firefox via geckodriver.
    #[default]
    Firefox,
    /// Google Chrome via chromedriver.
    Chrome,
    /// Microsoft Edge via msedgedriver.
    Edge,
}

/// Structured subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Prints the readiness report of the remote end.
    Status,
    /// Lists the command catalog as `NAME METHOD ROUTE` lines.
    Commands,
    /// Creates a session, prints its id and leaves it running.
    NewSession {
        /// Browser to request.
        #[arg(long, value_enum, default_value_t = Browser::Firefox)]
        browser: Browser,
        /// Accepts untrusted TLS certificates.
        #[arg(long)]
        accept_insecure_certs: bool,
        /// Starts the browser without a visible window.
        #[arg(long)]
        headless: bool,
    },
    /// Runs one catalog command against an existing session.
    Invoke {
        /// Catalog command name (for example `GetTitle`).
        #[arg(value_name = "COMMAND")]
        name: String,
        /// Session to run the command in.
        #[arg(long)]
        session: String,
        /// Element id bound to `$[element]`.
        #[arg(long)]
        element: Option<String>,
        /// Named route parameter as `NAME=VALUE`; repeatable.
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// JSON request body.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Deletes an existing session.
    Quit {
        /// Session to delete.
        #[arg(long)]
        session: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_owned(), value.to_owned())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
