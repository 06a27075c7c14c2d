use anyhow::Result;

use super::super::{args::ConfigArgs, exit_status::ExitStatus, report};
use super::helper::load_settings;
use crate::workflow::Workflow;

pub fn compact(args: &ConfigArgs) -> Result<ExitStatus> {
    let settings = load_settings(args)?;
    let result = Workflow::new(&settings).compact();

    report::print_run(&result);

    Ok(if result.is_success() {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    })
}
