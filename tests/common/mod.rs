//! Shared helpers for driving the `kvctl` commands in-process.

#![cfg(feature = "cli")]
#![allow(dead_code)]

use std::ffi::OsString;
use std::io::Cursor;
use std::path::PathBuf;

use kvctl::cancel::CancelToken;
use kvctl::cli::{Cli, Ui};
use tempfile::TempDir;

/// Result of one invocation.
#[derive(Debug)]
pub struct Outcome {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl Outcome {
    pub fn assert_success(&self) {
        assert_eq!(self.code, 0, "expected success, stderr: {}", self.stderr);
        assert!(self.stderr.is_empty(), "unexpected stderr: {}", self.stderr);
    }

    pub fn assert_failure(&self, needle: &str) {
        assert_eq!(self.code, 1, "expected failure, stderr: {}", self.stderr);
        assert!(self.stdout.is_empty(), "failure wrote to stdout: {:?}", self.stdout);
        assert!(
            self.stderr.contains(needle),
            "stderr {:?} does not contain {:?}",
            self.stderr,
            needle
        );
    }
}

/// A temporary directory holding the store under test.
pub struct TestStore {
    pub dir: TempDir,
}

impl TestStore {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Location passed on the command line.
    pub fn location(&self) -> PathBuf {
        self.dir.path().join("store.db")
    }

    pub fn location_arg(&self) -> OsString {
        self.location().into_os_string()
    }
}

/// Run `kvctl <args>` with `stdin` as input.
pub fn run_with_input<I, S>(args: I, stdin: &[u8]) -> Outcome
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    run_with_token(args, stdin, CancelToken::new())
}

/// Run `kvctl <args>` with empty input.
pub fn run<I, S>(args: I) -> Outcome
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    run_with_input(args, b"")
}

/// Run `kvctl <args>` with a caller-supplied cancellation token.
///
/// `KVCTL_*` variables in the test environment are ignored.
pub fn run_with_token<I, S>(args: I, stdin: &[u8], token: CancelToken) -> Outcome
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = {
        let ui = Ui::new(Cursor::new(stdin.to_vec()), &mut stdout, &mut stderr);
        Cli::new(ui)
            .without_env()
            .with_cancel_token(token)
            .run(args.into_iter().map(Into::into))
    };
    Outcome {
        code,
        stdout,
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}
