use super::*;
use crate::testing::mocks::MockServiceInfo;
use std::time::{Duration, Instant};

fn policy(retry_count: u32, delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        retry_count,
        retry_delay: Duration::from_millis(delay_ms),
    }
}

#[tokio::test]
async fn test_healthy_on_first_attempt() {
    let service = MockServiceInfo::ready_after(0);

    wait_until_healthy(&service, &policy(3, 1)).await.unwrap();

    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_becomes_healthy_within_budget() {
    let service = MockServiceInfo::ready_after(2);

    wait_until_healthy(&service, &policy(3, 1)).await.unwrap();

    assert_eq!(service.calls(), 3);
}

#[tokio::test]
async fn test_gives_up_after_retry_count_attempts() {
    let service = MockServiceInfo::ready_after(3);

    let err = wait_until_healthy(&service, &policy(3, 1)).await.unwrap_err();

    assert_eq!(service.calls(), 3);
    match err {
        HealthError::Timeout {
            endpoint,
            attempts,
            last_error,
        } => {
            assert_eq!(endpoint, "http://mock-service");
            assert_eq!(attempts, 3);
            assert!(matches!(last_error, Some(CloudError::Unavailable(_))));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_retry_count_makes_one_attempt() {
    let service = MockServiceInfo::unreachable();

    let err = wait_until_healthy(&service, &policy(0, 1)).await.unwrap_err();

    assert_eq!(service.calls(), 1);
    assert!(err.to_string().contains("after 1 attempts"));
}

#[tokio::test]
async fn test_delay_only_between_attempts() {
    let service = MockServiceInfo::unreachable();
    let started = Instant::now();

    let _ = wait_until_healthy(&service, &policy(3, 40)).await;

    let elapsed = started.elapsed();
    assert_eq!(service.calls(), 3);
    assert!(elapsed >= Duration::from_millis(80));
}

#[tokio::test]
async fn test_first_attempt_is_immediate() {
    let service = MockServiceInfo::ready_after(0);
    let started = Instant::now();

    wait_until_healthy(&service, &policy(3, 5_000)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_client_waits_for_service() {
    let service = MockServiceInfo::ready_after(1);

    let client = WorkflowClient::with_service(Arc::new(service.clone()), &policy(2, 1))
        .await
        .unwrap();

    assert_eq!(client.endpoint(), "http://mock-service");
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn test_client_construction_fails_when_service_never_answers() {
    let service = MockServiceInfo::unreachable();

    let result = WorkflowClient::with_service(Arc::new(service), &policy(2, 1)).await;

    assert!(matches!(
        result,
        Err(HealthError::Timeout { attempts: 2, .. })
    ));
}

#[test]
fn test_timeout_message_includes_last_error() {
    let err = HealthError::Timeout {
        endpoint: "http://argo:2746".to_string(),
        attempts: 3,
        last_error: Some(CloudError::Unavailable("connection refused".to_string())),
    };
    let message = err.to_string();
    assert!(message.starts_with("http://argo:2746 did not become healthy after 3 attempts"));
    assert!(message.contains("connection refused"));
}
