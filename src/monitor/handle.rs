//! Both ends of a monitor's event queue.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Read side of a monitor's event queue.
///
/// Events arrive in exactly the order the background task produced them.
/// `None` from [`recv`](Self::recv) means the task reached a terminal state
/// (or was cancelled) and closed the queue. Dropping the handle early makes
/// the background task exit at its next send.
#[derive(Debug)]
pub struct MonitorHandle<E> {
    rx: mpsc::Receiver<E>,
}

impl<E> MonitorHandle<E> {
    /// Wait for the next event, or `None` once the queue is closed
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Drain the queue to completion
    pub async fn collect(mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

impl<E> Stream for MonitorHandle<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        self.rx.poll_recv(cx)
    }
}

/// Write side of a monitor's event queue, owned by the background task.
pub struct EventSink<E> {
    tx: mpsc::Sender<E>,
    cancel: Option<CancellationToken>,
}

impl<E> EventSink<E> {
    /// Create a bounded queue. A capacity of zero is raised to one.
    pub fn channel(capacity: usize, cancel: Option<CancellationToken>) -> (Self, MonitorHandle<E>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx, cancel }, MonitorHandle { rx })
    }

    /// Queue an event, waiting for room.
    ///
    /// Returns `false` when the consumer has gone away or the monitor was
    /// cancelled while waiting; the caller should stop producing.
    pub async fn send(&self, event: E) -> bool {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                result = self.tx.send(event) => result.is_ok(),
                _ = cancel.cancelled() => false,
            },
            None => self.tx.send(event).await.is_ok(),
        }
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` on cancel.
    pub async fn sleep(&self, duration: std::time::Duration) -> bool {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                _ = tokio::time::sleep(duration) => true,
                _ = cancel.cancelled() => false,
            },
            None => {
                tokio::time::sleep(duration).await;
                true
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
