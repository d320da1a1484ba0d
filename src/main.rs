use clap::Parser;
use std::process::ExitCode;

use detailer::cli::{self, Cli};

fn main() -> ExitCode {
    match cli::run(Cli::parse()) {
        0 => ExitCode::SUCCESS,
        code => ExitCode::from(code as u8),
    }
}
