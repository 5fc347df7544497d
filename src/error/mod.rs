use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod hints;

pub use codes::{describe_error_code, ErrorCode};
pub use hints::suggestion_for;

#[cfg(test)]
mod tests;

/// The unified error type for the entire Hoist application
#[derive(Error, Debug)]
pub enum HoistError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution {
        code: u16,
        message: String,
        command: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Cloud error: {message}")]
    Cloud {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Monitor error: {message}")]
    Monitor {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HoistError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message, None)
    }

    /// Create a configuration error with specific code and path
    pub fn config_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create an execution error with default code
    pub fn execution(message: impl Into<String>) -> Self {
        Self::execution_with_code(ErrorCode::EXEC_GENERIC, message, None)
    }

    /// Create an execution error with specific code
    pub fn execution_with_code(
        code: u16,
        message: impl Into<String>,
        command: Option<String>,
    ) -> Self {
        Self::Execution {
            code,
            message: message.into(),
            command,
            source: None,
        }
    }

    pub fn cloud_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Cloud {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn monitor_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Monitor {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Execution { source: src, .. }
            | Self::Cloud { source: src, .. }
            | Self::Monitor { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Execution { message, .. }
            | Self::Cloud { message, .. }
            | Self::Monitor { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Execution { .. } => 5,
            Self::Cloud { .. } => 6,
            Self::Monitor { .. } => 8,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Execution { code, .. }
            | Self::Cloud { code, .. }
            | Self::Monitor { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Execution {
                message, command, ..
            } => match command {
                Some(cmd) => format!("Command '{}' failed: {}", cmd, message),
                None => format!("Execution error: {}", message),
            },
            Self::Cloud { message, .. } => format!("Cloud request failed: {}", message),
            Self::Monitor { message, .. } => message.clone(),
            Self::Other { message, .. } => message.clone(),
        }
    }
}

/// Type alias for Results using HoistError
pub type Result<T> = std::result::Result<T, HoistError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

impl From<std::io::Error> for HoistError {
    fn from(err: std::io::Error) -> Self {
        HoistError::other("IO operation failed").with_source(err)
    }
}

impl From<crate::config::ConfigError> for HoistError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;

        let (code, path) = match &err {
            ConfigError::NotFound(path) => (ErrorCode::CONFIG_NOT_FOUND, Some(path.clone())),
            ConfigError::Read { path, .. } => (ErrorCode::CONFIG_PATH_ERROR, Some(path.clone())),
            ConfigError::Parse { path, .. } => {
                (ErrorCode::CONFIG_INVALID_TOML, Some(path.clone()))
            }
            ConfigError::Invalid(_) => (ErrorCode::CONFIG_INVALID_VALUE, None),
        };
        HoistError::config_with_code(code, err.to_string(), path).with_source(err)
    }
}

impl From<crate::cloud::CloudError> for HoistError {
    fn from(err: crate::cloud::CloudError) -> Self {
        use crate::cloud::CloudError;

        let code = match &err {
            CloudError::Request { .. } => ErrorCode::CLOUD_REQUEST_FAILED,
            CloudError::NotFound(_) => ErrorCode::CLOUD_NOT_FOUND,
            CloudError::Unavailable(_) => ErrorCode::CLOUD_UNAVAILABLE,
        };
        HoistError::cloud_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<crate::stack::StackDeletionError> for HoistError {
    fn from(err: crate::stack::StackDeletionError) -> Self {
        use crate::stack::StackDeletionError;

        let code = match &err {
            StackDeletionError::Failed => ErrorCode::MONITOR_STACK_DELETE_FAILED,
            StackDeletionError::UnexpectedStatus(_) => {
                ErrorCode::MONITOR_STACK_UNEXPECTED_STATUS
            }
            StackDeletionError::StatusQuery(_) => ErrorCode::MONITOR_STATUS_QUERY_FAILED,
        };
        HoistError::monitor_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<crate::deploy::DeployError> for HoistError {
    fn from(err: crate::deploy::DeployError) -> Self {
        use crate::deploy::DeployError;

        let code = match &err {
            DeployError::Exited { .. } => ErrorCode::EXEC_SUBPROCESS_FAILED,
            DeployError::Signaled(_) => ErrorCode::EXEC_SIGNAL_RECEIVED,
            DeployError::Output(_) | DeployError::Wait(_) => ErrorCode::EXEC_OUTPUT_ERROR,
        };
        HoistError::execution_with_code(code, err.to_string(), None).with_source(err)
    }
}

impl From<crate::health::HealthError> for HoistError {
    fn from(err: crate::health::HealthError) -> Self {
        use crate::health::HealthError;

        match &err {
            HealthError::Timeout { .. } => {
                HoistError::monitor_with_code(ErrorCode::MONITOR_HEALTH_TIMEOUT, err.to_string())
                    .with_source(err)
            }
            HealthError::Client { .. } => {
                HoistError::cloud_with_code(ErrorCode::CLOUD_REQUEST_FAILED, err.to_string())
                    .with_source(err)
            }
        }
    }
}
