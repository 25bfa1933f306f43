//! Command-line front end.
//!
//! [`run`] maps the first argument to a [`Command`] and hands it the rest.
//! Every command receives its input, output and diagnostic sinks through a
//! [`Ui`] at construction time and returns the process exit code.
//!
//! ```ignore
//! let code = kvctl::cli::run(std::env::args_os().skip(1), Ui::stdio());
//! std::process::exit(code);
//! ```

mod args;
mod get;
pub mod logging;
mod put;

use std::ffi::OsString;
use std::future::Future;
use std::io::{self, Read, Write};

use clap::{CommandFactory, FromArgMatches};

use crate::cancel::{CancelToken, CancellationController};
use crate::error::{Error, Result};
use crate::logging::debug;

pub use args::{Selection, StoreFlags};
pub use get::GetCommand;
pub use put::PutCommand;

/// Exit status for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for any failure.
pub const EXIT_FAILURE: i32 = 1;

/// Input, output and diagnostic sinks for a command.
pub struct Ui<'a> {
    reader: Box<dyn Read + 'a>,
    writer: Box<dyn Write + 'a>,
    error_writer: Box<dyn Write + 'a>,
}

impl<'a> Ui<'a> {
    pub fn new(
        reader: impl Read + 'a,
        writer: impl Write + 'a,
        error_writer: impl Write + 'a,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            error_writer: Box::new(error_writer),
        }
    }

    /// Read the whole input stream.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Write bytes to the output sink verbatim.
    pub fn output(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    /// Write a message line to the diagnostic sink.
    pub fn error(&mut self, msg: &str) {
        // Nowhere left to report a failing stderr.
        let _ = writeln!(self.error_writer, "{}", msg.trim_end());
        let _ = self.error_writer.flush();
    }

    /// Report `err` and return the failure exit code.
    pub fn fail(&mut self, err: &Error) -> i32 {
        debug!(error = %err, "command failed");
        self.error(&format!("Error: {}", err));
        EXIT_FAILURE
    }
}

impl Ui<'static> {
    /// Standard input, standard output and standard error.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout().lock(), io::stderr())
    }
}

/// A subcommand.
pub trait Command {
    /// Run with the arguments following the command name; returns the exit code.
    fn run(&mut self, args: Vec<OsString>) -> i32;
}

type Factory = for<'a> fn(Ui<'a>, CancelToken, bool) -> Box<dyn Command + 'a>;

struct CommandEntry {
    name: &'static str,
    synopsis: &'static str,
    factory: Factory,
}

fn get_command<'a>(ui: Ui<'a>, token: CancelToken, read_env: bool) -> Box<dyn Command + 'a> {
    let command = GetCommand::new(ui).with_cancel_token(token);
    Box::new(if read_env { command } else { command.without_env() })
}

fn put_command<'a>(ui: Ui<'a>, token: CancelToken, read_env: bool) -> Box<dyn Command + 'a> {
    let command = PutCommand::new(ui).with_cancel_token(token);
    Box::new(if read_env { command } else { command.without_env() })
}

const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "get",
        synopsis: GetCommand::SYNOPSIS,
        factory: get_command,
    },
    CommandEntry {
        name: "put",
        synopsis: PutCommand::SYNOPSIS,
        factory: put_command,
    },
];

/// Subcommand dispatcher.
pub struct Cli<'a> {
    ui: Ui<'a>,
    token: CancelToken,
    read_env: bool,
}

impl<'a> Cli<'a> {
    pub fn new(ui: Ui<'a>) -> Self {
        Self {
            ui,
            token: CancelToken::new(),
            read_env: true,
        }
    }

    /// Ignore the `KVCTL_*` environment variables; only flags and the
    /// config file select the store.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Use `token` as the cancellation flag that interrupt signals trip.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Dispatch `args` (without the program name) and return the exit code.
    pub fn run(mut self, args: impl IntoIterator<Item = OsString>) -> i32 {
        let mut args = args.into_iter();
        let Some(name) = args.next() else {
            self.ui.error(&help());
            return EXIT_FAILURE;
        };

        let Some(name) = name.to_str() else {
            self.ui.error(&format!(
                "Error: command name is not valid UTF-8: {}",
                name.to_string_lossy()
            ));
            return EXIT_FAILURE;
        };

        match name {
            "-h" | "--help" | "help" => {
                self.ui.error(&help());
                EXIT_SUCCESS
            }
            "-v" | "--version" | "version" => {
                let version = format!("{} {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                match self.ui.output(version.as_bytes()) {
                    Ok(()) => EXIT_SUCCESS,
                    Err(e) => self.ui.fail(&Error::Output(e)),
                }
            }
            _ => match COMMANDS.iter().find(|c| c.name == name) {
                Some(entry) => {
                    debug!(command = entry.name, "dispatching");
                    let mut command = (entry.factory)(self.ui, self.token, self.read_env);
                    command.run(args.collect())
                }
                None => {
                    self.ui.error(&format!("Error: unknown command '{}'\n", name));
                    self.ui.error(&help());
                    EXIT_FAILURE
                }
            },
        }
    }
}

/// Dispatch `args` (without the program name) using `ui` and return the exit code.
pub fn run(args: impl IntoIterator<Item = OsString>, ui: Ui<'_>) -> i32 {
    Cli::new(ui).run(args)
}

fn help() -> String {
    let width = COMMANDS.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut text = String::from(
        "Usage: kvctl [--version] [--help] <command> [<args>]\n\nAvailable commands are:\n",
    );
    for command in COMMANDS {
        text.push_str(&format!(
            "    {:width$}    {}\n",
            command.name,
            command.synopsis,
            width = width
        ));
    }
    text
}

/// Outcome of flag parsing.
pub(crate) enum Parsed<T> {
    Args(T),
    /// `--help` was requested; the rendered help text.
    Help(String),
}

/// Parse a command's flags with clap, turning clap failures into usage errors.
///
/// With `read_env` false, flags never fall back to their environment variables.
pub(crate) fn parse_flags<T: CommandFactory + FromArgMatches>(
    name: &str,
    args: Vec<OsString>,
    read_env: bool,
) -> Result<Parsed<T>> {
    let argv = std::iter::once(OsString::from(name)).chain(args);
    let mut command = T::command();
    if !read_env {
        command = command.mut_args(|arg| arg.env(None::<&str>));
    }
    let parsed = command
        .try_get_matches_from(argv)
        .and_then(|matches| T::from_arg_matches(&matches));
    match parsed {
        Ok(parsed) => Ok(Parsed::Args(parsed)),
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp => Ok(Parsed::Help(e.render().to_string())),
            _ => {
                let rendered = e.render().to_string();
                let first = rendered.lines().next().unwrap_or_default();
                Err(Error::usage(first.trim_start_matches("error: ").to_string()))
            }
        },
    }
}

/// Run the resolving and executing stages on a single-threaded runtime with
/// interrupt signals tripping `token`.
pub(crate) fn with_interrupts<T, F, Fut>(token: CancelToken, body: F) -> Result<T>
where
    F: FnOnce(CancellationController) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;

    let result = runtime.block_on(async move {
        let controller = CancellationController::listen_with(token);
        body(controller).await
    });

    // Do not wait for a storage call abandoned by an interrupt.
    runtime.shutdown_background();
    result
}
