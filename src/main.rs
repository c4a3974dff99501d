#![forbid(unsafe_code)]

use binzip::cli::{self, Cli, Invocation};
use clap::error::ErrorKind;
use clap::Parser;
use pretty_env_logger::formatted_timed_builder;

const DEFAULT_DEBUG_LOG_LEVEL: &str = "binzip=debug";
const DEFAULT_RELEASE_LOG_LEVEL: &str = "binzip=info";

fn init_logging() {
    let default_log_level = if cfg!(debug_assertions) {
        DEFAULT_DEBUG_LOG_LEVEL
    } else {
        DEFAULT_RELEASE_LOG_LEVEL
    };

    let mut log_builder = formatted_timed_builder();
    log_builder.parse_filters(
        &std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level.to_string()),
    );
    // Only fails if a logger is already installed.
    let _ = log_builder.try_init();
}

fn main() {
    init_logging();
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                println!("{e}");
                std::process::exit(1);
            }
        },
    };

    let res = Invocation::try_from(args).and_then(cli::run);

    if let Err(e) = res {
        println!("{e}");
        std::process::exit(1);
    }
}
