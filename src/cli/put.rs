//! `kvctl put`: store a value under a key.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::cancel::CancelToken;
use crate::error::{Error, Result, display_key};
use crate::logging::debug;

use super::args::{StoreFlags, arg_bytes, check_arity};
use super::{Command, EXIT_SUCCESS, Parsed, Ui, parse_flags, with_interrupts};

#[derive(Parser, Debug)]
#[command(name = "put", bin_name = "kvctl put")]
#[command(about = "Store a value in a KV store")]
#[command(
    override_usage = "kvctl put [OPTIONS] <LOCATION> <KEY> [VALUE]",
    after_help = "If VALUE is omitted it is read from standard input until end of file."
)]
struct PutArgs {
    #[command(flatten)]
    store: StoreFlags,

    /// Store location, key and optional value
    // Everything from the first positional on is positional, so values and
    // keys may start with '-'.
    #[arg(value_name = "ARGS", trailing_var_arg = true)]
    positional: Vec<OsString>,
}

/// Writes one value; produces no output on success.
pub struct PutCommand<'a> {
    ui: Ui<'a>,
    token: CancelToken,
    read_env: bool,
}

impl<'a> PutCommand<'a> {
    pub const SYNOPSIS: &'static str = "Store a value in a KV store";

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

    fn execute(&mut self, args: PutArgs) -> Result<()> {
        check_arity(args.positional.len(), 2, 3)?;
        let mut positional = args.positional.into_iter();
        let (Some(location), Some(key)) = (positional.next(), positional.next()) else {
            return Err(Error::usage("Not enough arguments (expected 2-3)"));
        };
        let location = PathBuf::from(location);
        let key = arg_bytes(key);
        let selection = args.store.select()?;

        let value = match positional.next() {
            Some(inline) => arg_bytes(inline),
            None => self.ui.read_all().map_err(Error::Input)?,
        };
        debug!(len = value.len(), "value collected");

        with_interrupts(self.token.clone(), |cancel| async move {
            let store = cancel
                .run_blocking(move || selection.open(&location))
                .await?;
            cancel.token().check()?;
            cancel
                .run_blocking(move || {
                    store.set(&key, &value).map_err(|source| Error::Write {
                        key: display_key(&key),
                        source,
                    })
                })
                .await
        })
    }
}

impl Command for PutCommand<'_> {
    fn run(&mut self, args: Vec<OsString>) -> i32 {
        let args = match parse_flags::<PutArgs>("put", args, self.read_env) {
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
