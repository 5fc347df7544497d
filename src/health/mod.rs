//! Startup health probing for freshly started services.
//!
//! A workflow-execution service deployed moments ago may take a while to
//! start answering. [`wait_until_healthy`] retries its info call a bounded
//! number of times, and [`WorkflowClient::connect`] does not return until
//! that succeeds.

use std::sync::Arc;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::cloud::http::HttpServiceInfo;
use crate::cloud::{CloudError, ServiceInfo};

pub use crate::config::RetryPolicy;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("{endpoint} did not become healthy after {attempts} attempts{}", describe_last(.last_error))]
    Timeout {
        endpoint: String,
        attempts: u32,
        last_error: Option<CloudError>,
    },

    #[error("cannot reach {endpoint}: {source}")]
    Client {
        endpoint: String,
        #[source]
        source: CloudError,
    },
}

fn describe_last(last_error: &Option<CloudError>) -> String {
    match last_error {
        Some(err) => format!(" (last error: {})", err),
        None => String::new(),
    }
}

/// Call `service.info()` until it succeeds or the policy's attempts run out.
///
/// The policy's delay is slept before every attempt except the first. A
/// `retry_count` of zero still makes one attempt.
pub async fn wait_until_healthy(
    service: &dyn ServiceInfo,
    policy: &RetryPolicy,
) -> Result<(), HealthError> {
    let attempts = policy.retry_count.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            sleep(policy.retry_delay).await;
        }

        match service.info().await {
            Ok(()) => {
                debug!(
                    "{} healthy after {} attempt(s)",
                    service.endpoint(),
                    attempt
                );
                return Ok(());
            }
            Err(err) => {
                info!(
                    "{} not ready (attempt {}/{}): {}",
                    service.endpoint(),
                    attempt,
                    attempts,
                    err
                );
                last_error = Some(err);
            }
        }
    }

    Err(HealthError::Timeout {
        endpoint: service.endpoint().to_string(),
        attempts,
        last_error,
    })
}

/// Client for the workflow-execution service.
///
/// Only constructed once the service has answered a health check.
pub struct WorkflowClient {
    service: Arc<dyn ServiceInfo>,
}

impl std::fmt::Debug for WorkflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowClient")
            .field("endpoint", &self.service.endpoint())
            .finish()
    }
}

impl WorkflowClient {
    /// Connect over HTTP, waiting for the service to come up
    pub async fn connect(endpoint: &str, policy: &RetryPolicy) -> Result<Self, HealthError> {
        let service = HttpServiceInfo::new(endpoint).map_err(|source| HealthError::Client {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Self::with_service(Arc::new(service), policy).await
    }

    /// Wait for an already built service handle
    pub async fn with_service(
        service: Arc<dyn ServiceInfo>,
        policy: &RetryPolicy,
    ) -> Result<Self, HealthError> {
        wait_until_healthy(service.as_ref(), policy).await?;
        Ok(Self { service })
    }

    pub fn endpoint(&self) -> &str {
        self.service.endpoint()
    }
}
