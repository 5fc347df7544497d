//! HTTP health endpoint of the workflow-execution service.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use super::{CloudError, ServiceInfo};

/// Path of the server's info endpoint
pub const INFO_PATH: &str = "/api/v1/info";

/// Calls `GET <endpoint>/api/v1/info`
pub struct HttpServiceInfo {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpServiceInfo {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CloudError::request("ClientBuild", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn info_url(&self) -> String {
        format!("{}{}", self.endpoint, INFO_PATH)
    }
}

#[async_trait]
impl ServiceInfo for HttpServiceInfo {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn info(&self) -> Result<(), CloudError> {
        let url = self.info_url();
        trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CloudError::Unavailable(e.to_string()))?;

        response
            .error_for_status()
            .map(|_| ())
            .map_err(|e| CloudError::Unavailable(e.to_string()))
    }
}
