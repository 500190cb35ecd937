use std::process::ExitCode;

use clap::Parser;

use pixelpicker::cli::{self, CliArgs};
use pixelpicker::{log_info, logger};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Truncates last session's log.
    logger::init();
    log_info!("Opening {}", args.image.display());

    cli::run(args)
}
