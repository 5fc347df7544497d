use super::*;
use futures::StreamExt;

#[test]
fn test_builder_collects_args_and_dir() {
    let command = ProcessCommandBuilder::new("cdk")
        .arg("deploy")
        .args(["--profile", "dev"])
        .current_dir(std::path::Path::new("/tmp"))
        .build();

    assert_eq!(command.program, "cdk");
    assert_eq!(command.args, vec!["deploy", "--profile", "dev"]);
    assert!(command.env.is_empty());
    assert_eq!(
        command.working_dir.as_deref(),
        Some(std::path::Path::new("/tmp"))
    );
}

#[tokio::test]
async fn test_mock_runner_streams_scripted_output() {
    let (manager, mock) = SubprocessManager::mock();
    mock.expect_command("cdk")
        .returns_stdout(&["synth ok"])
        .returns_stderr(&["Stack | 1/2 | CREATE_IN_PROGRESS"])
        .returns_exit_code(0)
        .finish();

    let command = ProcessCommandBuilder::new("cdk").arg("deploy").build();
    let stream = manager.runner().run_streaming(command).await.unwrap();

    let stdout: Vec<_> = stream.stdout.map(|l| l.unwrap()).collect().await;
    let stderr: Vec<_> = stream.stderr.map(|l| l.unwrap()).collect().await;
    assert_eq!(stdout, vec!["synth ok"]);
    assert_eq!(stderr, vec!["Stack | 1/2 | CREATE_IN_PROGRESS"]);
    assert_eq!(stream.status.await.unwrap(), ExitStatus::Success);
    assert!(mock.verify_called("cdk", 1));
}

#[tokio::test]
async fn test_mock_runner_spawn_failure() {
    let (manager, mock) = SubprocessManager::mock();
    mock.expect_command("cdk").fails_to_spawn().finish();

    let result = manager
        .runner()
        .run_streaming(ProcessCommandBuilder::new("cdk").build())
        .await;
    assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
}

#[tokio::test]
async fn test_mock_runner_without_expectation() {
    let (manager, _mock) = SubprocessManager::mock();
    let result = manager
        .runner()
        .run_streaming(ProcessCommandBuilder::new("terraform").build())
        .await;
    assert!(matches!(
        result,
        Err(ProcessError::MockExpectationNotMet(_))
    ));
}

#[test]
fn test_process_error_converts_with_code() {
    use crate::error::{ErrorCode, HoistError};

    let err: HoistError = ProcessError::CommandNotFound("cdk".to_string()).into();
    assert_eq!(err.code(), ErrorCode::EXEC_COMMAND_NOT_FOUND);
    assert!(err.to_string().contains("Command not found: cdk"));
}
