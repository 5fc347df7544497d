//! Live tailing of a remote log group.
//!
//! [`LogTailer::tail`] follows a log group from "now" until the caller
//! cancels. Each query that moves the continuation token forward and returns
//! entries becomes one [`StreamEvent`]; a failed query becomes a final event
//! carrying the error.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cloud::{CloudError, LogEntry, LogQuery, LogStore};
use crate::config::LogTailConfig;
use crate::monitor::{spawn_poller, MonitorHandle, PollOptions, Sample, Sampler};


/// A batch of newly observed log lines, or the error that ended the tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub logs: Vec<String>,
    pub error: Option<CloudError>,
}

impl StreamEvent {
    pub fn lines(logs: Vec<String>) -> Self {
        Self { logs, error: None }
    }

    pub fn failure(error: CloudError) -> Self {
        Self {
            logs: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct LogTailer {
    store: Arc<dyn LogStore>,
    config: LogTailConfig,
    capacity: usize,
}

impl LogTailer {
    pub fn new(store: Arc<dyn LogStore>, config: LogTailConfig) -> Self {
        Self {
            store,
            config,
            capacity: crate::monitor::DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Follow `log_group`, optionally restricted to `stream_names`.
    ///
    /// The queue stays open until `cancel` fires or a query fails.
    pub fn tail(
        &self,
        cancel: CancellationToken,
        log_group: &str,
        stream_names: &[String],
    ) -> MonitorHandle<StreamEvent> {
        debug!(
            "Tailing {} ({} streams) every {:?}",
            log_group,
            stream_names.len(),
            self.config.poll_interval
        );

        let sampler = TailSampler {
            store: Arc::clone(&self.store),
            query: LogQuery {
                log_group: log_group.to_string(),
                stream_names: stream_names.to_vec(),
                start_time: None,
                filter_pattern: self.config.filter_pattern.clone(),
                next_token: None,
            },
        };
        let options = PollOptions::new(self.config.poll_interval)
            .with_capacity(self.capacity)
            .with_cancellation(cancel);

        spawn_poller(sampler, options)
    }
}

struct TailSampler {
    store: Arc<dyn LogStore>,
    /// Carries the start time and the last seen token between polls
    query: LogQuery,
}

#[async_trait]
impl Sampler for TailSampler {
    type Event = StreamEvent;

    async fn sample(&mut self) -> Sample<StreamEvent> {
        if self.query.start_time.is_none() {
            self.query.start_time = Some(Utc::now().timestamp_millis());
        }

        let page = match self.store.query(&self.query).await {
            Ok(page) => page,
            Err(err) => {
                warn!("Log query on {} failed: {}", self.query.log_group, err);
                return Sample::finish(StreamEvent::failure(err));
            }
        };

        if page.next_token == self.query.next_token {
            trace!("No new entries in {}", self.query.log_group);
            return Sample::pending();
        }
        self.query.next_token = page.next_token;

        if page.entries.is_empty() {
            return Sample::pending();
        }

        let logs = group_by_stream(page.entries)
            .iter()
            .map(format_entry)
            .collect();
        Sample::emit(vec![StreamEvent::lines(logs)])
    }
}

/// Group entries per stream, keeping streams in order of first appearance
/// and each stream's entries in chronological order.
pub fn group_by_stream(entries: Vec<LogEntry>) -> Vec<LogEntry> {
    let mut groups: Vec<(String, Vec<LogEntry>)> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|(stream, _)| *stream == entry.stream) {
            Some((_, group)) => group.push(entry),
            None => groups.push((entry.stream.clone(), vec![entry])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(_, mut group)| {
            // Stable, so entries sharing a timestamp keep provider order
            group.sort_by_key(|entry| entry.timestamp);
            group
        })
        .collect()
}

/// Render an entry as `<RFC3339 time> [<stream>] <message>`
pub fn format_entry(entry: &LogEntry) -> String {
    let message = entry.message.trim_end_matches(['\n', '\r']);
    match Utc.timestamp_millis_opt(entry.timestamp).single() {
        Some(time) => format!("{} [{}] {}", time.to_rfc3339(), entry.stream, message),
        None => format!("{} [{}] {}", entry.timestamp, entry.stream, message),
    }
}
