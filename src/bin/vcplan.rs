use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    ExitCode::from(vcplan::run(vcplan::Cli::parse()))
}
