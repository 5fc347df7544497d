use super::*;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Replays a fixed script, then keeps reporting "pending" forever
struct ScriptedSampler {
    script: VecDeque<Sample<u32>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSampler {
    fn new(script: Vec<Sample<u32>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: script.into(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Sampler for ScriptedSampler {
    type Event = u32;

    async fn sample(&mut self) -> Sample<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or_else(Sample::pending)
    }
}

fn fast() -> PollOptions {
    PollOptions::new(Duration::from_millis(1))
}

#[tokio::test]
async fn test_events_arrive_in_order_and_queue_closes() {
    let (sampler, calls) = ScriptedSampler::new(vec![
        Sample::emit(vec![1, 2]),
        Sample::pending(),
        Sample::emit(vec![3]),
        Sample::finish(4),
        Sample::emit(vec![99]),
    ]);

    let events = spawn_poller(sampler, fast()).collect().await;

    assert_eq!(events, vec![1, 2, 3, 4]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_small_capacity_preserves_order() {
    let (sampler, _) = ScriptedSampler::new(vec![
        Sample::emit((0..20).collect()),
        Sample::finish(20),
    ]);

    let events = spawn_poller(sampler, fast().with_capacity(1)).collect().await;
    assert_eq!(events, (0..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_handle_is_a_stream() {
    let (sampler, _) = ScriptedSampler::new(vec![Sample::emit(vec![7]), Sample::finish(8)]);

    let handle = spawn_poller(sampler, fast());
    let events: Vec<u32> = StreamExt::collect::<Vec<_>>(handle).await;
    assert_eq!(events, vec![7, 8]);
}

#[tokio::test]
async fn test_delay_first_waits_before_sampling() {
    let (sampler, calls) = ScriptedSampler::new(vec![Sample::finish(1)]);
    let options = PollOptions::new(Duration::from_millis(200)).delay_first();

    let mut handle = spawn_poller(sampler, options);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(handle.recv().await, Some(1));
    assert_eq!(handle.recv().await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancellation_closes_queue() {
    let (sampler, calls) = ScriptedSampler::new(vec![Sample::emit(vec![1])]);
    let cancel = CancellationToken::new();
    let options = PollOptions::new(Duration::from_millis(5)).with_cancellation(cancel.clone());

    let mut handle = spawn_poller(sampler, options);
    assert_eq!(handle.recv().await, Some(1));

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(2), handle.recv()).await;
    assert_eq!(result.unwrap(), None);

    let after_close = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_close);
}

#[tokio::test]
async fn test_cancelled_before_start_emits_nothing() {
    let (sampler, _) = ScriptedSampler::new(vec![Sample::emit(vec![1]), Sample::finish(2)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let events = spawn_poller(sampler, fast().with_cancellation(cancel))
        .collect()
        .await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_dropping_handle_stops_the_task() {
    struct Endless(Arc<AtomicUsize>);

    #[async_trait]
    impl Sampler for Endless {
        type Event = usize;

        async fn sample(&mut self) -> Sample<usize> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Sample::emit(vec![n])
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let mut handle = spawn_poller(Endless(Arc::clone(&calls)), fast().with_capacity(1));
    assert_eq!(handle.recv().await, Some(0));
    drop(handle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn test_sink_send_fails_after_cancel() {
    let cancel = CancellationToken::new();
    let (sink, _handle) = EventSink::channel(1, Some(cancel.clone()));

    assert!(sink.send(1u8).await);
    cancel.cancel();
    // Queue is full, so only the cancellation can resolve this send
    assert!(!sink.send(2u8).await);
    assert!(sink.is_cancelled());
    assert!(!sink.sleep(Duration::from_secs(60)).await);
}
