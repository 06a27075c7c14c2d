use std::process::ExitCode;

use clap::Parser;
use poflow::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match poflow::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// Log to stderr. `POFLOW_LOG` takes precedence over `-v`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "poflow=debug" } else { "poflow=warn" };
    let filter = EnvFilter::try_from_env("POFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
