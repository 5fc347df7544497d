//! End-to-end monitor behavior through the public API and mocks

use hoist::cloud::{CloudError, LogEntry, LogPage, StackStatus};
use hoist::deploy::{DeployError, DeployRequest, DeployRunner, Operation, ProgressEvent};
use hoist::health::{wait_until_healthy, HealthError, WorkflowClient};
use hoist::logs::LogTailer;
use hoist::stack::{DeletionResult, StackDeletionError, StackPoller};
use hoist::testing::fast_config;
use hoist::testing::mocks::{MockLogStore, MockProcessRunner, MockServiceInfo, MockStackControl};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_stack_deletion_reports_one_success_then_closes() {
    let config = fast_config();
    let control = MockStackControl::new()
        .then_status(StackStatus::DeleteInProgress)
        .then_status(StackStatus::DeleteComplete);
    let poller = StackPoller::new(Arc::new(control.clone()), config.stack);

    let mut handle = poller.track_deletion("web-stack").await.unwrap();

    let first = tokio::time::timeout(WAIT, handle.recv()).await.unwrap();
    assert_eq!(first, Some(DeletionResult::success()));
    assert_eq!(tokio::time::timeout(WAIT, handle.recv()).await.unwrap(), None);
}

#[tokio::test]
async fn test_stack_rollback_status_is_hard_failure() {
    let config = fast_config();
    let control = MockStackControl::new()
        .then_status(StackStatus::from_provider("DELETE_IN_PROGRESS"))
        .then_status(StackStatus::from_provider("ROLLBACK_COMPLETE"));
    let poller = StackPoller::new(Arc::new(control.clone()), config.stack);

    let events = tokio::time::timeout(WAIT, poller.track_deletion("web-stack").await.unwrap().collect())
        .await
        .unwrap();

    assert_eq!(
        events,
        vec![DeletionResult::failure(StackDeletionError::UnexpectedStatus(
            "ROLLBACK_COMPLETE".to_string()
        ))]
    );
    assert_eq!(control.status_calls(), 2);
}

#[tokio::test]
async fn test_log_tail_groups_streams_and_stops_on_cancel() {
    let config = fast_config();
    let store = MockLogStore::new()
        .then_page(LogPage {
            entries: vec![],
            next_token: Some("T1".to_string()),
        })
        .then_page(LogPage {
            entries: vec![],
            next_token: Some("T1".to_string()),
        })
        .then_page(LogPage {
            entries: vec![
                LogEntry {
                    stream: "A".to_string(),
                    timestamp: 1_000,
                    message: "a1".to_string(),
                },
                LogEntry {
                    stream: "B".to_string(),
                    timestamp: 1_001,
                    message: "b1".to_string(),
                },
                LogEntry {
                    stream: "A".to_string(),
                    timestamp: 1_002,
                    message: "a2".to_string(),
                },
            ],
            next_token: Some("T2".to_string()),
        });
    let tailer = LogTailer::new(Arc::new(store.clone()), config.logs);
    let cancel = CancellationToken::new();

    let mut handle = tailer.tail(cancel.clone(), "/ecs/web", &["A".to_string(), "B".to_string()]);
    let event = tokio::time::timeout(WAIT, handle.recv()).await.unwrap().unwrap();

    assert_eq!(event.logs.len(), 3);
    assert!(event.logs[0].ends_with("[A] a1"));
    assert!(event.logs[1].ends_with("[A] a2"));
    assert!(event.logs[2].ends_with("[B] b1"));

    cancel.cancel();
    assert_eq!(tokio::time::timeout(WAIT, handle.recv()).await.unwrap(), None);
}

#[tokio::test]
async fn test_log_query_failure_ends_tail() {
    let config = fast_config();
    let store = MockLogStore::new().then_error(CloudError::request("FilterLogEvents", "AccessDenied"));
    let tailer = LogTailer::new(Arc::new(store), config.logs);

    let events = tokio::time::timeout(
        WAIT,
        tailer.tail(CancellationToken::new(), "/ecs/web", &[]).collect(),
    )
    .await
    .unwrap();

    assert_eq!(events.len(), 1);
    assert!(events[0].is_error());
    assert!(events[0].logs.is_empty());
}

#[tokio::test]
async fn test_deploy_through_mock_tool() {
    let workspace = TempDir::new().unwrap();
    let mock = MockProcessRunner::new();
    mock.expect_command("cdk")
        .returns_stdout(&[
            "web | 1/3 | CREATE_IN_PROGRESS | AWS::S3::Bucket",
            "web | 3/3 | CREATE_COMPLETE | AWS::CloudFormation::Stack",
            "Outputs:",
        ])
        .finish();
    mock.expect_command("cdk").returns_exit_code(2).finish();

    let config = fast_config();
    let runner = DeployRunner::new(Arc::new(mock.clone()), config.deploy);

    let request = DeployRequest::new(Operation::Deploy, workspace.path()).target("web");
    let events = runner.execute(&request).await.unwrap().collect().await;
    let steps: Vec<_> = events.iter().map(|e| e.current_step).collect();
    assert_eq!(steps, vec![Some(1), Some(3), None, None]);
    assert_eq!(events.last(), Some(&ProgressEvent::finished(Ok(()))));

    let request = DeployRequest::new(Operation::Destroy, workspace.path()).target("web");
    let events = runner.execute(&request).await.unwrap().collect().await;
    assert_eq!(
        events,
        vec![ProgressEvent::finished(Err(DeployError::Exited { code: 2 }))]
    );

    assert!(mock.verify_called("cdk", 2));
    assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_health_check_retries_until_ready() {
    let config = fast_config();
    let service = MockServiceInfo::ready_after(2);

    wait_until_healthy(&service, &config.health).await.unwrap();
    assert_eq!(service.calls(), 3);

    let never = MockServiceInfo::unreachable();
    let err = WorkflowClient::with_service(Arc::new(never.clone()), &config.health)
        .await
        .unwrap_err();
    assert!(matches!(err, HealthError::Timeout { attempts: 3, .. }));
    assert_eq!(never.calls(), 3);
}
