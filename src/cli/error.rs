//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Serialize { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(_) | ApplicationError::Parse { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err: CliError = ApplicationError::Config {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }

    #[test]
    fn given_domain_error_when_mapping_exit_code_then_dataerr() {
        let err: CliError = ApplicationError::from(DomainError::NoRoot).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(err.to_string(), "no root record (every record references a parent)");
    }
}
