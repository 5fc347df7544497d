//! Background monitoring of slow, externally controlled operations.
//!
//! A monitor is started by a call that returns a [`MonitorHandle`] right away.
//! One background task owns the write side of the queue, pushes events in the
//! order it observes them, and closes the queue when the operation reaches a
//! terminal state. The caller drains the handle at its own pace; the bounded
//! queue makes the task wait when the caller falls behind.
//!
//! Interval-driven monitors are built from a [`Sampler`] and
//! [`spawn_poller`]. Monitors fed by another event source (such as subprocess
//! output lines) use [`EventSink`] directly.

pub mod handle;
pub mod poller;

#[cfg(test)]
mod tests;

pub use handle::{EventSink, MonitorHandle};
pub use poller::{spawn_poller, PollOptions, Sample, Sampler, DEFAULT_QUEUE_CAPACITY};
