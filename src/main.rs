use std::process::ExitCode;

use kvctl::cli::{self, Ui, logging};

fn main() -> ExitCode {
    let init = logging::LoggingConfig::from_env().and_then(|config| logging::init(&config));
    if let Err(e) = init {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let code = cli::run(std::env::args_os().skip(1), Ui::stdio());
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
