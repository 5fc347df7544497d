//! The "poll until terminal" combinator shared by the stack and log monitors.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::handle::{EventSink, MonitorHandle};

/// Default bound on queued, unread events
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Outcome of one sampling step
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<E> {
    /// Events to queue, in order
    pub events: Vec<E>,
    /// Whether the operation reached a terminal state
    pub terminal: bool,
}

impl<E> Sample<E> {
    /// Nothing to report, keep polling
    pub fn pending() -> Self {
        Self {
            events: Vec::new(),
            terminal: false,
        }
    }

    /// Report events and keep polling
    pub fn emit(events: Vec<E>) -> Self {
        Self {
            events,
            terminal: false,
        }
    }

    /// Report a final event and stop
    pub fn finish(event: E) -> Self {
        Self {
            events: vec![event],
            terminal: true,
        }
    }
}

/// Observes an external operation one step at a time.
///
/// Failures are expressed as events in the returned [`Sample`]; a sampler
/// never panics or returns an error to the polling loop.
#[async_trait]
pub trait Sampler: Send + 'static {
    type Event: Send + 'static;

    async fn sample(&mut self) -> Sample<Self::Event>;
}

/// Scheduling knobs for [`spawn_poller`]
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    /// Sleep before the first sample instead of after it
    pub delay_first: bool,
    pub capacity: usize,
    pub cancel: Option<CancellationToken>,
}

impl PollOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            delay_first: false,
            capacity: DEFAULT_QUEUE_CAPACITY,
            cancel: None,
        }
    }

    pub fn delay_first(mut self) -> Self {
        self.delay_first = true;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Spawn one background task that drives `sampler` until it reports a
/// terminal sample, the token is cancelled, or the handle is dropped.
///
/// Cancellation is cooperative: a sample already in flight completes, its
/// results are discarded, and the queue closes.
pub fn spawn_poller<S: Sampler>(sampler: S, options: PollOptions) -> MonitorHandle<S::Event> {
    let (sink, handle) = EventSink::channel(options.capacity, options.cancel.clone());
    tokio::spawn(drive(sampler, options, sink));
    handle
}

async fn drive<S: Sampler>(mut sampler: S, options: PollOptions, sink: EventSink<S::Event>) {
    let mut cycle: u64 = 0;

    loop {
        if cycle > 0 || options.delay_first {
            if !sink.sleep(options.interval).await {
                debug!("Poller cancelled while waiting after {} cycles", cycle);
                return;
            }
        }
        cycle += 1;

        let sample = sampler.sample().await;
        if sink.is_cancelled() {
            debug!("Poller cancelled after cycle {}", cycle);
            return;
        }

        trace!(
            "Cycle {} produced {} events (terminal: {})",
            cycle,
            sample.events.len(),
            sample.terminal
        );

        for event in sample.events {
            if !sink.send(event).await {
                debug!("Event consumer went away, stopping poller");
                return;
            }
        }

        if sample.terminal {
            debug!("Poller reached a terminal state after {} cycles", cycle);
            return;
        }
    }
}
