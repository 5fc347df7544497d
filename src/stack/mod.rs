//! Stack deletion tracking.
//!
//! [`StackPoller::track_deletion`] issues the delete request and then polls
//! the stack's status in the background until the deletion settles. The
//! queue carries exactly one [`DeletionResult`] before it closes.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::cloud::{CloudError, StackControl, StackStatus};
use crate::config::StackPollerConfig;
use crate::monitor::{spawn_poller, MonitorHandle, PollOptions, Sample, Sampler};


/// Why a tracked deletion did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackDeletionError {
    #[error("stack deletion failed")]
    Failed,

    #[error("unexpected stack status while deleting: {0}")]
    UnexpectedStatus(String),

    #[error("failed to query stack status: {0}")]
    StatusQuery(#[from] CloudError),
}

/// Terminal outcome of a tracked deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    /// `None` on success
    pub error: Option<StackDeletionError>,
}

impl DeletionResult {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn failure(error: StackDeletionError) -> Self {
        Self { error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<(), StackDeletionError> {
        match self.error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

pub struct StackPoller {
    control: Arc<dyn StackControl>,
    config: StackPollerConfig,
    capacity: usize,
}

impl StackPoller {
    pub fn new(control: Arc<dyn StackControl>, config: StackPollerConfig) -> Self {
        Self {
            control,
            config,
            capacity: crate::monitor::DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Delete `stack_id` and follow the deletion to completion.
    ///
    /// A rejected delete request is returned here and nothing is polled.
    pub async fn track_deletion(
        &self,
        stack_id: &str,
    ) -> Result<MonitorHandle<DeletionResult>, CloudError> {
        self.control.delete_stack(stack_id).await?;
        debug!(
            "Deletion of stack {} requested, polling every {:?}",
            stack_id, self.config.poll_interval
        );

        let sampler = DeletionSampler {
            control: Arc::clone(&self.control),
            stack_id: stack_id.to_string(),
        };
        let options = PollOptions::new(self.config.poll_interval)
            .delay_first()
            .with_capacity(self.capacity);

        Ok(spawn_poller(sampler, options))
    }
}

struct DeletionSampler {
    control: Arc<dyn StackControl>,
    stack_id: String,
}

#[async_trait]
impl Sampler for DeletionSampler {
    type Event = DeletionResult;

    async fn sample(&mut self) -> Sample<DeletionResult> {
        let status = match self.control.stack_status(&self.stack_id).await {
            Ok(status) => status,
            Err(err) => {
                warn!("Status query for stack {} failed: {}", self.stack_id, err);
                return Sample::finish(DeletionResult::failure(err.into()));
            }
        };

        trace!("Stack {} status: {}", self.stack_id, status);
        match status {
            StackStatus::DeleteInProgress => Sample::pending(),
            StackStatus::DeleteComplete => {
                debug!("Stack {} deleted", self.stack_id);
                Sample::finish(DeletionResult::success())
            }
            StackStatus::DeleteFailed => {
                Sample::finish(DeletionResult::failure(StackDeletionError::Failed))
            }
            StackStatus::Other(name) => Sample::finish(DeletionResult::failure(
                StackDeletionError::UnexpectedStatus(name),
            )),
        }
    }
}
