//! Batch submission over real HTTP against a mock server

use crate::common::assertions::SubmitBatchResultAssertions;
use crate::common::{BatchResponseBuilder, fast_retry};
use std::time::Duration;
use storage_batch::{
    BatchClientOptions, BatchError, BlobBatch, BlobBatchClient, Context, DeleteBlobOptions,
    OperationKind,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout: Duration) -> BlobBatchClient {
    let options = BatchClientOptions {
        retry: fast_retry(),
        timeout,
        ..Default::default()
    };
    BlobBatchClient::new(&server.uri(), options).unwrap()
}

fn two_deletes() -> BlobBatch {
    let mut batch = BlobBatch::new();
    batch.delete_blob("c1", "b1", DeleteBlobOptions::default());
    batch.delete_blob("c1", "b2", DeleteBlobOptions::default());
    batch
}

fn accepted(builder: BatchResponseBuilder) -> ResponseTemplate {
    ResponseTemplate::new(202)
        .insert_header("x-ms-request-id", "aggregate-req")
        .set_body_raw(builder.body(), builder.content_type().as_str())
}

#[tokio::test]
async fn test_submit_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("comp", "batch"))
        .and(header("x-ms-version", "2020-02-10"))
        .respond_with(accepted(
            BatchResponseBuilder::new("batchresponse_http")
                .deleted()
                .not_found(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let result = client
        .submit_batch(&Context::new(), &two_deletes())
        .await
        .unwrap();

    result.assert_in_order();
    result.assert_succeeded(0, OperationKind::DeleteBlob);
    result.assert_failed(1, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(result.request_id(), Some("aggregate-req"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/mixed; boundary=batch_"));

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("DELETE /c1/b1 HTTP/1.1\r\n"));
    assert!(body.contains("DELETE /c1/b2 HTTP/1.1\r\n"));
}

#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(accepted(
            BatchResponseBuilder::new("batchresponse_retry")
                .deleted()
                .deleted(),
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let result = client
        .submit_batch(&Context::new(), &two_deletes())
        .await
        .unwrap();

    assert_eq!(result.succeeded(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_request_timeout_surfaces_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            accepted(BatchResponseBuilder::new("batchresponse_slow").deleted().deleted())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(100));
    let error = client
        .submit_batch(&Context::new(), &two_deletes())
        .await
        .unwrap_err();

    assert!(matches!(error, BatchError::Http(_)));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_deadline_cancels_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            accepted(BatchResponseBuilder::new("batchresponse_slow").deleted().deleted())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(30));
    let ctx = Context::new().with_timeout(Duration::from_millis(100));
    let error = client
        .submit_batch(&ctx, &two_deletes())
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
