//! Stratum CLI - namespaced key-value stores for validation artifacts

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = stratum::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
