//! `kvctl get`: print the value stored under a key.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::cancel::CancelToken;
use crate::error::{Error, Result, display_key};
use crate::logging::debug;

use super::args::{StoreFlags, arg_bytes, check_arity};
use super::{Command, EXIT_SUCCESS, Parsed, Ui, parse_flags, with_interrupts};

#[derive(Parser, Debug)]
#[command(name = "get", bin_name = "kvctl get")]
#[command(about = "Fetch a value from a KV store")]
#[command(override_usage = "kvctl get [OPTIONS] <LOCATION> <KEY>")]
struct GetArgs {
    #[command(flatten)]
    store: StoreFlags,

    /// Store location followed by the key
    // Everything from the first positional on is positional, so values and
    // keys may start with '-'.
    #[arg(value_name = "ARGS", trailing_var_arg = true)]
    positional: Vec<OsString>,
}

/// Fetches one value and writes it to the output sink without a trailing newline.
pub struct GetCommand<'a> {
    ui: Ui<'a>,
    token: CancelToken,
    read_env: bool,
}

impl<'a> GetCommand<'a> {
    pub const SYNOPSIS: &'static str = "Fetch a value from a KV store";

    pub fn new(ui: Ui<'a>) -> Self {
        Self {
            ui,
            token: CancelToken::new(),
            read_env: true,
        }
    }

    /// Use `token` as the cancellation flag.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Ignore the `KVCTL_*` environment variables when parsing flags.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    fn execute(&mut self, args: GetArgs) -> Result<()> {
        check_arity(args.positional.len(), 2, 2)?;
        let mut positional = args.positional.into_iter();
        let (Some(location), Some(key)) = (positional.next(), positional.next()) else {
            return Err(Error::usage("Not enough arguments (expected 2)"));
        };
        let location = PathBuf::from(location);
        let key = arg_bytes(key);
        let selection = args.store.select()?;

        let value = with_interrupts(self.token.clone(), |cancel| async move {
            let lookup = key.clone();
            let store = cancel
                .run_blocking(move || selection.open(&location))
                .await?;
            cancel.token().check()?;
            let found = cancel
                .run_blocking(move || {
                    store.get(&lookup).map_err(|source| Error::Read {
                        key: display_key(&lookup),
                        source,
                    })
                })
                .await?;
            found.ok_or_else(|| Error::KeyNotFound(display_key(&key)))
        })?;

        self.token.check()?;
        debug!(len = value.len(), "rendering value");
        // Raw bytes: no newline is appended, so binary values round-trip.
        self.ui.output(&value).map_err(Error::Output)
    }
}

impl Command for GetCommand<'_> {
    fn run(&mut self, args: Vec<OsString>) -> i32 {
        let args = match parse_flags::<GetArgs>("get", args, self.read_env) {
            Ok(Parsed::Args(args)) => args,
            Ok(Parsed::Help(text)) => {
                self.ui.error(&text);
                return EXIT_SUCCESS;
            }
            Err(e) => return self.ui.fail(&e),
        };

        match self.execute(args) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => self.ui.fail(&e),
        }
    }
}
