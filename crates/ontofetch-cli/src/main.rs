use ontofetch_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; init() falls back to stderr
    // if the state dir is unwritable.
    logging::init();

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("ontofetch error: {:#}", err);
        std::process::exit(1);
    }
}
