//! ltui - Linear from the terminal, shaped for coding agents

use std::process::ExitCode;

use ltui::cli::emit_error;
use ltui::{classify, ErrorCode};

fn main() -> ExitCode {
    let Err(e) = ltui::cli::run() else {
        return ExitCode::SUCCESS;
    };

    let record = classify(&e);
    let hint = match record.code {
        ErrorCode::AuthMissing => {
            Some("Run `ltui auth add --profile <name> --api-key <key>` or set LINEAR_API_KEY")
        }
        _ => None,
    };
    eprintln!("{}", emit_error(record.code.as_str(), &record.message, hint));
    ExitCode::FAILURE
}
