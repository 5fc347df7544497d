//! AWS-backed stack control (CloudFormation) and log store (CloudWatch Logs).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::error::DisplayErrorContext as StackErrorContext;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext as LogsErrorContext;
use tracing::{debug, trace};

use super::{CloudError, LogEntry, LogPage, LogQuery, LogStore, StackControl, StackStatus};

/// Prefix of cursors synthesized once the provider stops returning tokens
const CURSOR_PREFIX: &str = "after:";

/// Position kept between queries once the provider has caught up: the newest
/// timestamp returned so far and the ids of events already returned at it.
///
/// Encoded as `after:<timestamp>:<id>,<id>`. Later queries resume *at* the
/// timestamp, so entries written late within the same millisecond are still
/// picked up while the listed ids are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cursor {
    timestamp: i64,
    seen: Vec<String>,
}

impl Cursor {
    fn parse(token: &str) -> Option<Self> {
        let rest = token.strip_prefix(CURSOR_PREFIX)?;
        let (timestamp, ids) = rest.split_once(':').unwrap_or((rest, ""));
        let timestamp = timestamp.parse().ok()?;
        let seen = ids
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self { timestamp, seen })
    }

    fn encode(&self) -> String {
        format!("{}{}:{}", CURSOR_PREFIX, self.timestamp, self.seen.join(","))
    }

    fn already_seen(&self, timestamp: i64, id: &str) -> bool {
        timestamp == self.timestamp && self.seen.iter().any(|seen| seen == id)
    }

    /// Move past `events` (timestamp, id). Ids are carried over from
    /// `previous` when the newest timestamp did not change.
    fn advance(previous: Option<&Cursor>, events: &[(i64, &str)]) -> Option<Cursor> {
        let newest = events.iter().map(|(timestamp, _)| *timestamp).max()?;
        let mut seen = match previous {
            Some(previous) if previous.timestamp == newest => previous.seen.clone(),
            _ => Vec::new(),
        };
        for (timestamp, id) in events {
            if *timestamp == newest && !id.is_empty() && !seen.iter().any(|s| s == id) {
                seen.push(id.to_string());
            }
        }
        Some(Cursor {
            timestamp: newest,
            seen,
        })
    }
}

#[derive(Debug, PartialEq)]
struct ResumePoint {
    start_time: Option<i64>,
    provider_token: Option<String>,
    cursor: Option<Cursor>,
}

/// Load shared AWS configuration, optionally for a named profile
pub async fn load_sdk_config(profile: Option<&str>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }
}

#[async_trait]
impl StackControl for CloudFormationStacks {
    async fn delete_stack(&self, stack_id: &str) -> Result<(), CloudError> {
        debug!("Requesting deletion of stack {}", stack_id);

        self.client
            .delete_stack()
            .stack_name(stack_id)
            .send()
            .await
            .map_err(|e| CloudError::request("DeleteStack", StackErrorContext(&e)))?;

        Ok(())
    }

    async fn stack_status(&self, stack_id: &str) -> Result<StackStatus, CloudError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_id)
            .send()
            .await
            .map_err(|e| CloudError::request("DescribeStacks", StackErrorContext(&e)))?;

        let stack = output
            .stacks()
            .first()
            .ok_or_else(|| CloudError::NotFound(format!("stack {}", stack_id)))?;

        let status = stack
            .stack_status()
            .map(|s| StackStatus::from_provider(s.as_str()))
            .ok_or_else(|| {
                CloudError::request("DescribeStacks", "response carried no stack status")
            })?;

        trace!("Stack {} is {}", stack_id, status);
        Ok(status)
    }
}

pub struct CloudWatchLogStore {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(config),
        }
    }

    /// Split a token into the provider token or our own cursor
    fn resume_point(query: &LogQuery) -> ResumePoint {
        match query.next_token.as_deref() {
            Some(token) if token.starts_with(CURSOR_PREFIX) => {
                let cursor = Cursor::parse(token);
                ResumePoint {
                    start_time: cursor.as_ref().map(|c| c.timestamp).or(query.start_time),
                    provider_token: None,
                    cursor,
                }
            }
            token => ResumePoint {
                start_time: query.start_time,
                provider_token: token.map(str::to_string),
                cursor: None,
            },
        }
    }
}

#[async_trait]
impl LogStore for CloudWatchLogStore {
    async fn query(&self, query: &LogQuery) -> Result<LogPage, CloudError> {
        let resume = Self::resume_point(query);
        let stream_names = if query.stream_names.is_empty() {
            None
        } else {
            Some(query.stream_names.clone())
        };

        let output = self
            .client
            .filter_log_events()
            .log_group_name(&query.log_group)
            .set_log_stream_names(stream_names)
            .set_start_time(resume.start_time)
            .set_filter_pattern(query.filter_pattern.clone())
            .set_next_token(resume.provider_token.clone())
            .send()
            .await
            .map_err(|e| CloudError::request("FilterLogEvents", LogsErrorContext(&e)))?;

        let fresh: Vec<_> = output
            .events()
            .iter()
            .filter(|event| {
                !resume.cursor.as_ref().is_some_and(|cursor| {
                    cursor.already_seen(
                        event.timestamp().unwrap_or_default(),
                        event.event_id().unwrap_or_default(),
                    )
                })
            })
            .collect();

        let entries: Vec<LogEntry> = fresh
            .iter()
            .map(|event| LogEntry {
                stream: event.log_stream_name().unwrap_or_default().to_string(),
                timestamp: event.timestamp().unwrap_or_default(),
                message: event.message().unwrap_or_default().to_string(),
            })
            .collect();

        // The provider drops its token once caught up; fall back to a cursor
        // at the newest entry so the position still only moves forward.
        let next_token = match output.next_token() {
            Some(token) => Some(token.to_string()),
            None => {
                let positions: Vec<(i64, &str)> = fresh
                    .iter()
                    .map(|event| {
                        (
                            event.timestamp().unwrap_or_default(),
                            event.event_id().unwrap_or_default(),
                        )
                    })
                    .collect();
                match Cursor::advance(resume.cursor.as_ref(), &positions) {
                    Some(cursor) => Some(cursor.encode()),
                    None => query.next_token.clone(),
                }
            }
        };

        trace!(
            "FilterLogEvents on {} returned {} entries",
            query.log_group,
            entries.len()
        );

        Ok(LogPage {
            entries,
            next_token,
        })
    }
}
