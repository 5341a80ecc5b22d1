//! devstate - devfile command editor

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = devstate_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
