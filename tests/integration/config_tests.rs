//! Configuration loading tests

use crate::common::{
    BatchResponseBuilder, PlaybackTransport, TEST_ACCOUNT, TEST_ACCOUNT_KEY, playback_options,
};
use std::io::Write;
use std::sync::Arc;
use storage_batch::{BatchConfig, BatchError, BlobBatch, Context, DeleteBlobOptions};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_load_yaml_file() {
    let file = write_config(
        r#"
service_url: "https://myaccount.blob.core.windows.net"
account_name: "myaccount"
account_key: "YmF0Y2gtY2xpZW50LXRlc3Qta2V5LTAxMjM0NTY3ODk="
timeout_secs: 30
retry:
  max_retries: 5
  retry_delay_ms: 500
log_level: "debug"
"#,
    );

    let config = BatchConfig::from_file(file.path()).await.unwrap();
    assert_eq!(
        config.service_url.as_deref(),
        Some("https://myaccount.blob.core.windows.net")
    );
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.retry_delay_ms, 500);
    assert_eq!(config.retry.max_retry_delay_ms, 120_000);
    assert_eq!(config.api_version, "2020-02-10");
    assert_eq!(config.log_level, "debug");
    assert!(!config.log_json);
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_invalid_yaml_is_config_error() {
    let file = write_config("retry: [not, a, map");
    let error = BatchConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(error, BatchError::Config(_)));
}

#[tokio::test]
async fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = BatchConfig::from_file(dir.path().join("absent.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(error, BatchError::Config(_)));
}

#[tokio::test]
async fn test_environment_overrides_file() {
    let file = write_config("account_name: fromfile\ntimeout_secs: 30\n");
    let mut config = BatchConfig::from_file(file.path()).await.unwrap();

    config
        .apply_env(env(&[
            ("STORAGE_BATCH_ACCOUNT_NAME", "fromenv"),
            ("STORAGE_BATCH_MAX_RETRIES", "7"),
            ("STORAGE_BATCH_LOG_JSON", "true"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

    assert_eq!(config.account_name.as_deref(), Some("fromenv"));
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.retry.max_retries, 7);
    assert!(config.log_json);
}

#[test]
fn test_unparseable_override_is_rejected() {
    let error = BatchConfig::from_env_vars(env(&[("STORAGE_BATCH_TIMEOUT_SECS", "soon")]))
        .unwrap_err();
    assert!(matches!(error, BatchError::Config(ref m) if m.contains("STORAGE_BATCH_TIMEOUT_SECS")));
}

#[tokio::test]
async fn test_client_from_account_settings_signs_requests() {
    let config = BatchConfig::from_env_vars(env(&[
        ("STORAGE_BATCH_ACCOUNT_NAME", TEST_ACCOUNT),
        ("STORAGE_BATCH_ACCOUNT_KEY", TEST_ACCOUNT_KEY),
    ]))
    .unwrap();
    config.validate().unwrap();

    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_cfg").deleted().build(),
    ));
    let client = config
        .build_client_with(playback_options(transport.clone()))
        .unwrap();
    assert_eq!(
        client.service_url().as_str(),
        "https://myaccount.blob.core.windows.net/"
    );

    let mut batch = BlobBatch::new();
    batch.delete_blob("c1", "b1", DeleteBlobOptions::default());
    client.submit_batch(&Context::new(), &batch).await.unwrap();

    let authorization = transport.recorded()[0]
        .header("authorization")
        .unwrap()
        .to_string();
    assert!(authorization.starts_with("SharedKey myaccount:"));
}

#[test]
fn test_client_from_connection_string() {
    let config = BatchConfig::from_env_vars(env(&[(
        "STORAGE_BATCH_CONNECTION_STRING",
        "UseDevelopmentStorage=true",
    )]))
    .unwrap();
    config.validate().unwrap();

    let client = config
        .build_client_with(playback_options(Arc::new(PlaybackTransport::new())))
        .unwrap();
    assert_eq!(
        client.service_url().as_str(),
        "http://127.0.0.1:10000/devstoreaccount1"
    );
}
