use crate::error::{ErrorCode, HoistError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while running '{command}': {source}")]
    IoError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// Convert ProcessError to HoistError
impl From<ProcessError> for HoistError {
    fn from(err: ProcessError) -> Self {
        let (code, command) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()))
            }
            ProcessError::SpawnFailed { command, .. } => {
                (ErrorCode::EXEC_SPAWN_FAILED, Some(command.clone()))
            }
            ProcessError::IoError { command, .. } => {
                (ErrorCode::EXEC_OUTPUT_ERROR, Some(command.clone()))
            }
            ProcessError::InternalError { .. } | ProcessError::MockExpectationNotMet(_) => {
                (ErrorCode::EXEC_GENERIC, None)
            }
        };

        HoistError::execution_with_code(code, err.to_string(), command).with_source(err)
    }
}
