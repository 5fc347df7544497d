use super::*;
use crate::cloud::CloudError;
use crate::stack::StackDeletionError;

#[test]
fn test_error_creation_and_chaining() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "cdk.out");
    let err = HoistError::execution("Cannot clean scratch directory")
        .with_source(io_err)
        .with_context("after destroy");

    assert_eq!(err.code(), ErrorCode::EXEC_GENERIC);
    assert!(err.to_string().contains("[E4000]"));
    assert!(err.user_message().contains("after destroy"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_exit_codes_by_category() {
    assert_eq!(HoistError::config("bad").exit_code(), 2);
    assert_eq!(HoistError::execution("bad").exit_code(), 5);
    assert_eq!(HoistError::other("bad").exit_code(), 1);
}

#[test]
fn test_cloud_error_conversion() {
    let err: HoistError = CloudError::NotFound("stack my-app".to_string()).into();
    assert_eq!(err.code(), ErrorCode::CLOUD_NOT_FOUND);
    assert_eq!(err.exit_code(), 6);
    assert!(err.user_message().contains("stack my-app"));
}

#[test]
fn test_stack_error_conversion() {
    let err: HoistError = StackDeletionError::UnexpectedStatus("ROLLBACK_COMPLETE".into()).into();
    assert_eq!(err.code(), ErrorCode::MONITOR_STACK_UNEXPECTED_STATUS);
    assert!(err.to_string().contains("ROLLBACK_COMPLETE"));

    let err: HoistError = StackDeletionError::Failed.into();
    assert_eq!(err.code(), ErrorCode::MONITOR_STACK_DELETE_FAILED);
}

#[test]
fn test_config_error_keeps_path() {
    let path = std::path::PathBuf::from("/etc/hoist.toml");
    let err: HoistError = crate::config::ConfigError::NotFound(path.clone()).into();
    match &err {
        HoistError::Config { path: Some(p), code, .. } => {
            assert_eq!(p, &path);
            assert_eq!(*code, ErrorCode::CONFIG_NOT_FOUND);
        }
        other => panic!("Expected config error, got {other:?}"),
    }
}

#[test]
fn test_deploy_error_conversion() {
    use crate::deploy::DeployError;

    let err: HoistError = DeployError::Exited { code: 1 }.into();
    assert_eq!(err.code(), ErrorCode::EXEC_SUBPROCESS_FAILED);
    assert_eq!(err.exit_code(), 5);

    let err: HoistError = DeployError::Signaled(15).into();
    assert_eq!(err.code(), ErrorCode::EXEC_SIGNAL_RECEIVED);
}

#[test]
fn test_health_error_conversion() {
    use crate::health::HealthError;

    let err: HoistError = HealthError::Timeout {
        endpoint: "http://argo:2746".to_string(),
        attempts: 3,
        last_error: None,
    }
    .into();
    assert_eq!(err.code(), ErrorCode::MONITOR_HEALTH_TIMEOUT);
    assert_eq!(err.exit_code(), 8);
}
