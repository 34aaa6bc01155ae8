//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{NavigationError, ValidationError};
use crate::infrastructure::traits::{AnalyzerError, ExtractError};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Extract(ExtractError::NotFound(_)) => crate::exitcode::NOINPUT,
                InfraError::Extract(_) => crate::exitcode::DATAERR,
                InfraError::Analyzer(AnalyzerError::NotConfigured) => crate::exitcode::CONFIG,
                InfraError::Analyzer(AnalyzerError::Command { .. }) => crate::exitcode::UNAVAILABLE,
                InfraError::Analyzer(AnalyzerError::InvalidResponse { .. }) => {
                    crate::exitcode::DATAERR
                }
                InfraError::Application(app) => match app {
                    ApplicationError::Validation(_)
                    | ApplicationError::Navigation(_)
                    | ApplicationError::Json { .. } => crate::exitcode::DATAERR,
                    ApplicationError::LibraryNotFound { .. }
                    | ApplicationError::NotADirectory(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        ApplicationError::from(e).into()
    }
}

impl From<NavigationError> for CliError {
    fn from(e: NavigationError) -> Self {
        ApplicationError::from(e).into()
    }
}

impl From<AnalyzerError> for CliError {
    fn from(e: AnalyzerError) -> Self {
        CliError::Infra(InfraError::Analyzer(e))
    }
}

impl From<ExtractError> for CliError {
    fn from(e: ExtractError) -> Self {
        CliError::Infra(InfraError::Extract(e))
    }
}
