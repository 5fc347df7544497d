//! Seams to the cloud provider.
//!
//! Monitors only talk to these traits. Production implementations live in
//! [`http`] and, with the `aws` feature, in `aws`; tests use the mocks in
//! [`crate::testing::mocks`].

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod http;

#[cfg(feature = "aws")]
pub mod aws;

/// Failure of a single provider request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    #[error("{operation} request failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl CloudError {
    pub fn request(operation: &'static str, message: impl fmt::Display) -> Self {
        Self::Request {
            operation,
            message: message.to_string(),
        }
    }
}

/// Stack status as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    /// Any other status, carrying the provider's name for it
    Other(String),
}

impl StackStatus {
    /// Map the provider's status name onto the statuses the poller knows
    pub fn from_provider(name: &str) -> Self {
        match name {
            "DELETE_IN_PROGRESS" => Self::DeleteInProgress,
            "DELETE_COMPLETE" => Self::DeleteComplete,
            "DELETE_FAILED" => Self::DeleteFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteInProgress => write!(f, "DELETE_IN_PROGRESS"),
            Self::DeleteComplete => write!(f, "DELETE_COMPLETE"),
            Self::DeleteFailed => write!(f, "DELETE_FAILED"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Infrastructure stack control plane
#[async_trait]
pub trait StackControl: Send + Sync {
    /// Request deletion; returns once the request is accepted
    async fn delete_stack(&self, stack_id: &str) -> Result<(), CloudError>;

    /// Current status of the stack
    async fn stack_status(&self, stack_id: &str) -> Result<StackStatus, CloudError>;
}

/// One query against a log group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub log_group: String,
    /// Restrict to these streams; empty means all streams
    pub stream_names: Vec<String>,
    /// Only entries at or after this time (epoch milliseconds)
    pub start_time: Option<i64>,
    pub filter_pattern: Option<String>,
    /// Continuation token returned by the previous query
    pub next_token: Option<String>,
}

/// A single log line tagged with its stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub stream: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub message: String,
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub next_token: Option<String>,
}

/// Remote log store
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn query(&self, query: &LogQuery) -> Result<LogPage, CloudError>;
}

/// Trivial "are you up" call on a remote service
#[async_trait]
pub trait ServiceInfo: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Any `Ok` counts as healthy
    async fn info(&self) -> Result<(), CloudError>;
}
