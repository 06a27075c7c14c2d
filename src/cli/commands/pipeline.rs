use anyhow::{Context, Result};
use tokio::runtime::Builder;

use super::super::{args::ConfigArgs, exit_status::ExitStatus, report};
use super::helper::load_settings;
use crate::review::TerminalReviewer;
use crate::translate::HttpTranslator;
use crate::workflow::{Stages, Workflow};

/// Run `stages` for every configured language and print the summary.
pub fn pipeline(args: &ConfigArgs, stages: Stages) -> Result<ExitStatus> {
    let settings = load_settings(args)?;

    let translator = if stages.translate {
        Some(
            HttpTranslator::new(&settings.translation)
                .context("Failed to set up the translation client")?,
        )
    } else {
        None
    };
    let mut reviewer = stages.review.then(TerminalReviewer::stdio);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let result = runtime.block_on(Workflow::new(&settings).run(
        stages,
        translator.as_ref(),
        reviewer.as_mut(),
    ))?;

    report::print_run(&result);

    Ok(if result.is_success() {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    })
}
