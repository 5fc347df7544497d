use super::loader::read_config_file;
use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_match_documented_values() {
    let config = HoistConfig::default();
    assert_eq!(config.stack.poll_interval, Duration::from_secs(5));
    assert_eq!(config.logs.poll_interval, Duration::from_secs(1));
    assert_eq!(config.health.retry_count, 3);
    assert_eq!(config.health.retry_delay, Duration::from_secs(3));
    assert_eq!(config.deploy.program, "cdk");
    assert_eq!(config.queue_capacity, crate::monitor::DEFAULT_QUEUE_CAPACITY);
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
[stack]
poll_interval = "250ms"

[deploy]
profile = "staging"
"#,
    );

    let config = read_config_file(file.path()).await.unwrap();
    assert_eq!(config.stack.poll_interval, Duration::from_millis(250));
    assert_eq!(config.deploy.profile.as_deref(), Some("staging"));
    assert_eq!(config.deploy.program, "cdk");
    assert_eq!(config.logs.poll_interval, Duration::from_secs(1));
}

#[tokio::test]
async fn test_full_file() {
    let file = write_config(
        r#"
queue_capacity = 4

[logs]
poll_interval = "2s"
filter_pattern = "ERROR"

[health]
retry_count = 5
retry_delay = "10s"
"#,
    );

    let config = read_config_file(file.path()).await.unwrap();
    assert_eq!(config.queue_capacity, 4);
    assert_eq!(config.logs.filter_pattern.as_deref(), Some("ERROR"));
    assert_eq!(config.health.retry_count, 5);
    assert_eq!(config.health.retry_delay, Duration::from_secs(10));
}

#[tokio::test]
async fn test_unknown_key_is_rejected() {
    let file = write_config("[stack]\npoll_every = \"1s\"\n");
    let err = read_config_file(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[tokio::test]
async fn test_explicit_missing_file_is_an_error() {
    let err = load_config(Some(std::path::Path::new("/no/such/hoist.toml")))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[tokio::test]
async fn test_explicit_file_is_validated() {
    let file = write_config("queue_capacity = 0\n");
    let err = load_config(Some(file.path())).await.unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_zero_interval_is_invalid() {
    let mut config = HoistConfig::default();
    config.logs.poll_interval = Duration::ZERO;
    assert!(config.validate().is_err());
}
