use std::process::ExitCode;

use clap::Parser;

use photojot::cli;
use photojot::logger;

fn main() -> ExitCode {
    logger::init();
    let args = cli::Cli::parse();
    cli::run(args)
}
