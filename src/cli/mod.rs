//! Command-line interface layer.
//!
//! Parses arguments, resolves [`Settings`](crate::config::Settings), drives
//! the workflow and prints the end-of-run summary. Library users can skip
//! this module and use [`Workflow`](crate::workflow::Workflow) directly.

pub mod args;
mod commands;
mod exit_status;
mod report;
mod run;

use anyhow::Result;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;
pub use report::{FAILURE_MARK, SUCCESS_MARK};

/// Run the parsed command. Errors are fatal to the whole process.
pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(Arguments {
        command: Some(command),
    }) = args.with_command_or_help()
    else {
        return Ok(ExitStatus::Success);
    };
    run::run(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_prints_help_and_succeeds() {
        let status = run_cli(Arguments { command: None }).unwrap();
        assert_eq!(status, ExitStatus::Success);
    }
}
