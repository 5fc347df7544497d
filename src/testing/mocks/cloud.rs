//! Scripted cloud collaborators

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::cloud::{
    CloudError, LogPage, LogQuery, LogStore, ServiceInfo, StackControl, StackStatus,
};

/// Stack control plane that replays scripted status responses.
///
/// Once the script runs out every further query reports
/// `DELETE_IN_PROGRESS`.
#[derive(Clone, Default)]
pub struct MockStackControl {
    state: Arc<Mutex<StackScript>>,
}

#[derive(Default)]
struct StackScript {
    delete_error: Option<CloudError>,
    statuses: VecDeque<Result<StackStatus, CloudError>>,
    delete_calls: Vec<String>,
    status_calls: usize,
}

impl MockStackControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the delete request with `error`
    pub fn fail_delete(self, error: CloudError) -> Self {
        self.state.lock().unwrap().delete_error = Some(error);
        self
    }

    pub fn then_status(self, status: StackStatus) -> Self {
        self.state.lock().unwrap().statuses.push_back(Ok(status));
        self
    }

    pub fn then_error(self, error: CloudError) -> Self {
        self.state.lock().unwrap().statuses.push_back(Err(error));
        self
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().unwrap().status_calls
    }
}

#[async_trait]
impl StackControl for MockStackControl {
    async fn delete_stack(&self, stack_id: &str) -> Result<(), CloudError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(stack_id.to_string());
        match &state.delete_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn stack_status(&self, _stack_id: &str) -> Result<StackStatus, CloudError> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;
        state
            .statuses
            .pop_front()
            .unwrap_or(Ok(StackStatus::DeleteInProgress))
    }
}

/// Log store that replays scripted pages.
///
/// Once the script runs out it keeps returning an empty page with the last
/// token it handed out, i.e. "nothing new".
#[derive(Clone, Default)]
pub struct MockLogStore {
    state: Arc<Mutex<LogScript>>,
}

#[derive(Default)]
struct LogScript {
    pages: VecDeque<Result<LogPage, CloudError>>,
    last_token: Option<String>,
    queries: Vec<LogQuery>,
}

impl MockLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_page(self, page: LogPage) -> Self {
        self.state.lock().unwrap().pages.push_back(Ok(page));
        self
    }

    pub fn then_error(self, error: CloudError) -> Self {
        self.state.lock().unwrap().pages.push_back(Err(error));
        self
    }

    /// Every query received so far
    pub fn queries(&self) -> Vec<LogQuery> {
        self.state.lock().unwrap().queries.clone()
    }
}

#[async_trait]
impl LogStore for MockLogStore {
    async fn query(&self, query: &LogQuery) -> Result<LogPage, CloudError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.clone());

        match state.pages.pop_front() {
            Some(Ok(page)) => {
                state.last_token = page.next_token.clone();
                Ok(page)
            }
            Some(Err(err)) => Err(err),
            None => Ok(LogPage {
                entries: Vec::new(),
                next_token: state.last_token.clone(),
            }),
        }
    }
}

/// Service that fails a fixed number of health checks before answering
#[derive(Clone)]
pub struct MockServiceInfo {
    endpoint: String,
    failures_before_ready: Option<usize>,
    calls: Arc<Mutex<usize>>,
}

impl MockServiceInfo {
    /// Healthy after `failures` failed calls
    pub fn ready_after(failures: usize) -> Self {
        Self {
            endpoint: "http://mock-service".to_string(),
            failures_before_ready: Some(failures),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Never healthy
    pub fn unreachable() -> Self {
        Self {
            endpoint: "http://mock-service".to_string(),
            failures_before_ready: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ServiceInfo for MockServiceInfo {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn info(&self) -> Result<(), CloudError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;

        match self.failures_before_ready {
            Some(failures) if *calls > failures => Ok(()),
            _ => Err(CloudError::Unavailable(format!(
                "connection refused (attempt {})",
                *calls
            ))),
        }
    }
}
