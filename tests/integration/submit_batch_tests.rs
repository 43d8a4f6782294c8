//! Batch submission against recorded responses

use crate::common::assertions::SubmitBatchResultAssertions;
use crate::common::fixtures::not_found_body;
use crate::common::{
    BatchResponseBuilder, PlaybackTransport, TEST_ACCOUNT, TEST_ACCOUNT_KEY, TEST_SERVICE_URL,
    playback_options,
};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use storage_batch::{
    AccessTier, BatchError, BlobBatch, BlobBatchClient, Context, DeleteBlobOptions, OperationKind,
    RawResponse, SetBlobAccessTierOptions, StaticTokenCredential, StorageSharedKeyCredential,
    SubOperationResult,
};

fn anonymous_client(transport: &Arc<PlaybackTransport>) -> BlobBatchClient {
    BlobBatchClient::new(TEST_SERVICE_URL, playback_options(transport.clone())).unwrap()
}

fn deletes(count: usize) -> BlobBatch {
    let mut batch = BlobBatch::new();
    for i in 0..count {
        batch.delete_blob("c1", format!("b{}", i), DeleteBlobOptions::default());
    }
    batch
}

// ==================== Wire Format Tests ====================

#[tokio::test]
async fn test_delete_and_set_tier_round_trip() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_1").deleted().tier_set().build(),
    ));
    let client = anonymous_client(&transport);

    let mut batch = BlobBatch::new();
    assert_eq!(batch.delete_blob("c1", "b1", DeleteBlobOptions::default()), 0);
    assert_eq!(
        batch.set_blob_access_tier("c1", "b2", AccessTier::Cool, SetBlobAccessTierOptions::default()),
        1
    );

    let result = client.submit_batch(&Context::new(), &batch).await.unwrap();

    result.assert_in_order();
    result.assert_succeeded(0, OperationKind::DeleteBlob);
    result.assert_succeeded(1, OperationKind::SetBlobAccessTier);
    assert!(matches!(
        result.outcomes[0].result,
        Ok(SubOperationResult::DeleteBlob(ref r)) if r.request_id.as_deref() == Some("req-0")
    ));
    assert_eq!(result.request_id(), Some("aggregate-req"));

    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 1);
    let request = &recorded[0];
    assert_eq!(request.method(), Method::POST);
    assert_eq!(request.relative_url(), "/?comp=batch");
    assert_eq!(request.header("x-ms-version"), Some("2020-02-10"));
    assert!(request.header("x-ms-client-request-id").is_some());

    let content_type = request.header("content-type").unwrap();
    let boundary = content_type
        .strip_prefix("multipart/mixed; boundary=")
        .unwrap();
    assert!(boundary.starts_with("batch_"));
    assert_eq!(
        request.header("content-length"),
        Some(request.body().len().to_string().as_str())
    );

    let body = transport.single_body();
    let first = body.find("Content-ID: 0\r\n").unwrap();
    let second = body.find("Content-ID: 1\r\n").unwrap();
    assert!(first < second);
    assert!(body.contains("\r\n\r\nDELETE /c1/b1 HTTP/1.1\r\n"));
    assert!(body.contains("\r\n\r\nPUT /c1/b2?comp=tier HTTP/1.1\r\n"));
    assert!(body.contains("x-ms-access-tier: Cool\r\n"));
    assert!(!body.contains("x-ms-version"));
    assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
}

#[tokio::test]
async fn test_outcome_count_matches_batch() {
    let mut response = BatchResponseBuilder::new("batchresponse_n");
    for _ in 0..5 {
        response = response.deleted();
    }
    let transport = Arc::new(PlaybackTransport::replying(response.build()));

    let result = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(5))
        .await
        .unwrap();

    assert_eq!(result.len(), 5);
    assert_eq!(result.succeeded(), 5);
    result.assert_in_order();
}

#[tokio::test]
async fn test_failed_item_is_isolated() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_iso")
            .deleted()
            .not_found()
            .deleted()
            .build(),
    ));

    let result = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(3))
        .await
        .unwrap();

    assert_eq!(result.len(), 3);
    result.assert_succeeded(0, OperationKind::DeleteBlob);
    result.assert_failed(1, StatusCode::NOT_FOUND);
    result.assert_succeeded(2, OperationKind::DeleteBlob);

    let error = result.outcomes[1].result.as_ref().unwrap_err();
    assert_eq!(error.error_code.as_deref(), Some("BlobNotFound"));
    assert_eq!(error.reason, "The specified blob does not exist.");
    assert_eq!(error.request_id.as_deref(), Some("req-missing"));
    // the sub-response body survives byte for byte
    assert_eq!(&error.raw.body[..], not_found_body().as_bytes());
}

#[tokio::test]
async fn test_response_boundary_is_read_from_content_type() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("something-else-entirely")
            .deleted()
            .build(),
    ));

    let result = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap();
    result.assert_succeeded(0, OperationKind::DeleteBlob);
}

// ==================== Fatal Error Tests ====================

#[tokio::test]
async fn test_malformed_response_is_fatal() {
    let response = BatchResponseBuilder::new("batchresponse_bad")
        .deleted()
        .trailer("")
        .build();
    let transport = Arc::new(PlaybackTransport::replying(response));

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap_err();
    assert!(matches!(error, BatchError::Protocol { .. }));
    assert!(error.is_fatal());
}

#[tokio::test]
async fn test_part_count_mismatch_is_fatal() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_short")
            .deleted()
            .build(),
    ));

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(2))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        BatchError::PartCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn test_wrong_content_type_is_fatal() {
    let response = RawResponse::new(StatusCode::ACCEPTED)
        .with_header("content-type", "application/xml")
        .with_body("<ok/>");
    let transport = Arc::new(PlaybackTransport::replying(response));

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap_err();
    assert!(matches!(error, BatchError::ContentType(_)));
}

#[tokio::test]
async fn test_rejected_batch_is_a_service_error() {
    let response = RawResponse::new(StatusCode::FORBIDDEN)
        .with_header("x-ms-error-code", "AuthorizationFailure")
        .with_body("<Error><Code>AuthorizationFailure</Code><Message>denied</Message></Error>");
    let transport = Arc::new(PlaybackTransport::replying(response));

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap_err();
    match error {
        BatchError::Service(e) => {
            assert_eq!(e.status, StatusCode::FORBIDDEN);
            assert_eq!(e.error_code.as_deref(), Some("AuthorizationFailure"));
            assert_eq!(e.message.as_deref(), Some("denied"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_response_is_fatal() {
    let transport = Arc::new(PlaybackTransport::new());
    transport.push(Ok(None));

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap_err();
    assert!(matches!(error, BatchError::MissingResponse));
}

// ==================== Usage Error Tests ====================

#[tokio::test]
async fn test_empty_batch_is_rejected_without_io() {
    let transport = Arc::new(PlaybackTransport::new());
    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &BlobBatch::new())
        .await
        .unwrap_err();

    assert!(matches!(error, BatchError::InvalidRequest(_)));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let transport = Arc::new(PlaybackTransport::new());
    let ctx = Context::new();
    ctx.cancel();

    let error = anonymous_client(&transport)
        .submit_batch(&ctx, &deletes(2))
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(transport.request_count(), 0);
}

// ==================== Retry Tests ====================

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let transport = Arc::new(PlaybackTransport::new());
    transport.push(Ok(Some(RawResponse::new(StatusCode::SERVICE_UNAVAILABLE))));
    transport.push(Ok(Some(
        BatchResponseBuilder::new("batchresponse_retry")
            .deleted()
            .build(),
    )));

    let result = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap();

    result.assert_succeeded(0, OperationKind::DeleteBlob);
    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 2);
    // both attempts carry the same body and client request id
    assert_eq!(recorded[0].body(), recorded[1].body());
    assert_eq!(
        recorded[0].header("x-ms-client-request-id"),
        recorded[1].header("x-ms-client-request-id")
    );
}

#[tokio::test]
async fn test_retries_stop_at_limit() {
    let transport = Arc::new(PlaybackTransport::new());
    for _ in 0..3 {
        transport.push(Ok(Some(RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR))));
    }

    let error = anonymous_client(&transport)
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap_err();

    assert!(matches!(error, BatchError::Service(ref e) if e.status == StatusCode::INTERNAL_SERVER_ERROR));
    assert!(error.is_retryable());
    // first attempt plus max_retries (2)
    assert_eq!(transport.request_count(), 3);
}

// ==================== Credential Tests ====================

#[tokio::test]
async fn test_shared_key_signs_aggregate_and_parts() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_sk")
            .deleted()
            .tier_set()
            .build(),
    ));
    let client = BlobBatchClient::with_shared_key(
        TEST_SERVICE_URL,
        Arc::new(StorageSharedKeyCredential::new(TEST_ACCOUNT, TEST_ACCOUNT_KEY)),
        playback_options(transport.clone()),
    )
    .unwrap();

    let mut batch = deletes(1);
    batch.set_blob_access_tier("c1", "b2", AccessTier::Hot, SetBlobAccessTierOptions::default());
    client.submit_batch(&Context::new(), &batch).await.unwrap();

    // sub-requests are signed but only the aggregate request is sent
    assert_eq!(transport.request_count(), 1);
    let request = &transport.recorded()[0];
    let authorization = request.header("authorization").unwrap();
    assert!(authorization.starts_with("SharedKey myaccount:"));

    let body = transport.single_body();
    assert_eq!(body.matches("authorization: SharedKey myaccount:").count(), 2);
    assert_eq!(body.matches("x-ms-date: ").count(), 2);
    assert_eq!(body.matches("user-agent: storage-batch/").count(), 2);
    assert!(!body.contains("x-ms-client-request-id"));
}

#[tokio::test]
async fn test_bearer_token_authorizes_aggregate_and_parts() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_bt").deleted().build(),
    ));
    let client = BlobBatchClient::with_token_credential(
        TEST_SERVICE_URL,
        Arc::new(StaticTokenCredential::new("token-123")),
        playback_options(transport.clone()),
    )
    .unwrap();

    client
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap();

    let request = &transport.recorded()[0];
    assert_eq!(request.header("authorization"), Some("Bearer token-123"));
    assert!(transport.single_body().contains("authorization: Bearer token-123\r\n"));
}

#[tokio::test]
async fn test_connection_string_client_uses_shared_key() {
    let transport = Arc::new(PlaybackTransport::replying(
        BatchResponseBuilder::new("batchresponse_cs").deleted().build(),
    ));
    let connection_string = format!(
        "DefaultEndpointsProtocol=https;AccountName={};AccountKey={};EndpointSuffix=core.windows.net",
        TEST_ACCOUNT, TEST_ACCOUNT_KEY
    );
    let client =
        BlobBatchClient::from_connection_string(&connection_string, playback_options(transport.clone()))
            .unwrap();
    assert_eq!(client.service_url().as_str(), "https://myaccount.blob.core.windows.net/");

    client
        .submit_batch(&Context::new(), &deletes(1))
        .await
        .unwrap();
    assert!(
        transport.recorded()[0]
            .header("authorization")
            .unwrap()
            .starts_with("SharedKey myaccount:")
    );
}
