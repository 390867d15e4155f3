use std::process::ExitCode;

use crate::core::error::PipelineError;

/// Exit status for CLI commands.
///
/// - `Success` (0): command completed, no errors reported
/// - `Failure` (1): error diagnostics, or a lookup that found nothing
/// - `Error` (2): bad arguments or configuration
/// - `ReadFailure` (3): a catalog or input could not be read or parsed
/// - `WriteFailure` (4): an output could not be written
/// - `KeyCollision` (5): two messages compiled to the same key
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
    ReadFailure,
    WriteFailure,
    KeyCollision,
}

impl ExitStatus {
    /// Status for a command that failed with `err`.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Read { .. } | PipelineError::Parse { .. }) => Self::ReadFailure,
            Some(PipelineError::Write { .. }) => Self::WriteFailure,
            Some(PipelineError::KeyCollision { .. }) => Self::KeyCollision,
            Some(PipelineError::Argument(_)) | None => Self::Error,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
            ExitStatus::ReadFailure => ExitCode::from(3),
            ExitStatus::WriteFailure => ExitCode::from(4),
            ExitStatus::KeyCollision => ExitCode::from(5),
        }
    }
}
