use std::process::ExitCode;

/// Process exit status.
///
/// - `Success` (0): every language went through its pipeline
/// - `Failure` (1): at least one language failed
/// - `Error` (2): the run could not start or was aborted (bad config, bad
///   arguments, unreadable mapping)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
