//! End-to-end pipeline tests against a mock export endpoint
//!
//! Each test runs the full coordinator with an in-memory or fault-injecting
//! store, and checks the summary, the remote keys and workspace cleanup.

mod common;

use ampsync::adapters::storage::{DocumentStore, ObjectStoreClient};
use ampsync::core::pipeline::summary::{EXIT_FATAL, EXIT_INCOMPLETE, EXIT_SUCCESS};
use ampsync::core::pipeline::{PipelineCoordinator, RunOptions, Stage};
use ampsync::core::shutdown::no_shutdown;
use ampsync::domain::TimeWindow;
use common::{export_archive, test_config, workspace_cleaned, FaultyStore, AUTH_HEADER, EXPORT_PATH};
use mockito::Matcher;
use std::sync::Arc;
use tempfile::TempDir;

fn window() -> TimeWindow {
    TimeWindow::parse("20240101T00", "20240101T23").unwrap()
}

fn two_record_archive() -> Vec<u8> {
    export_archive(&[
        ("187520/187520_2024-01-01_0#0.json", r#"{"event_type":"open"}"#),
        ("187520/hourly/187520_2024-01-01_1#0.json", r#"{"event_type":"close"}"#),
    ])
}

#[tokio::test]
async fn test_end_to_end_two_records() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "20240101T00".into()),
            Matcher::UrlEncoded("end".into(), "20240101T23".into()),
        ]))
        .match_header("authorization", AUTH_HEADER)
        .with_status(200)
        .with_body(two_record_archive())
        .expect(1)
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let store = Arc::new(ObjectStoreClient::in_memory());
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        store.clone(),
        no_shutdown(),
    )
    .unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    mock.assert_async().await;
    assert!(summary.failure.is_none(), "{:?}", summary.failure);
    assert_eq!(summary.documents, Some(2));
    assert_eq!(summary.uploaded(), 2);
    let reconciliation = summary.reconciliation.as_ref().unwrap();
    assert_eq!(reconciliation.local_count, 2);
    assert!(reconciliation.missing.is_empty());
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);

    let mut keys = store.list_keys("python_import").await.unwrap();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "python_import/187520_2024-01-01_0#0.json",
            "python_import/187520_2024-01-01_1#0.json"
        ]
    );
    assert!(workspace_cleaned(parent.path()));
}

#[tokio::test]
async fn test_sustained_export_failure_makes_three_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("service unavailable")
        .expect(3)
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let store = Arc::new(ObjectStoreClient::in_memory());
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        store.clone(),
        no_shutdown(),
    )
    .unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    mock.assert_async().await;
    let failure = summary.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Export);
    assert!(failure.message.contains("3 attempt"));
    assert!(summary.archive_bytes.is_none());
    assert!(summary.upload.is_none());
    assert_eq!(summary.exit_code(), EXIT_FATAL);
    assert!(store.list_keys("python_import").await.unwrap().is_empty());
    assert!(workspace_cleaned(parent.path()));
}

#[tokio::test]
async fn test_ambiguous_day_folder_stops_before_upload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(export_archive(&[
            ("111/a.json", "{}"),
            ("222/b.json", "{}"),
        ]))
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let store = Arc::new(ObjectStoreClient::in_memory());
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        store.clone(),
        no_shutdown(),
    )
    .unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    let failure = summary.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Unpack);
    assert!(failure.message.contains("111, 222"));
    assert!(summary.archive_bytes.is_some());
    assert!(summary.documents.is_none());
    assert_eq!(summary.exit_code(), EXIT_FATAL);
    assert!(store.list_keys("python_import").await.unwrap().is_empty());
    assert!(workspace_cleaned(parent.path()));
}

#[tokio::test]
async fn test_missing_day_folder_stops_before_upload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(export_archive(&[("export/a.json", "{}")]))
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        Arc::new(ObjectStoreClient::in_memory()),
        no_shutdown(),
    )
    .unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    assert_eq!(summary.failure.as_ref().unwrap().stage, Stage::Unpack);
    assert_eq!(summary.exit_code(), EXIT_FATAL);
}

#[tokio::test]
async fn test_upload_faults_are_isolated_and_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(export_archive(&[
            ("187520/a.json", "{}"),
            ("187520/b.json", "{}"),
            ("187520/c.json", "{}"),
            ("187520/d.json", "{}"),
        ]))
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let store = Arc::new(FaultyStore::new(&["/b.json", "/d.json"]));
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        store.clone(),
        no_shutdown(),
    )
    .unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    let upload = summary.upload.as_ref().unwrap();
    assert_eq!(upload.uploaded(), 2);
    assert_eq!(upload.failed.len(), 2);
    assert_eq!(upload.failed[0].key, "python_import/b.json");
    assert_eq!(
        store.written(),
        vec!["python_import/a.json", "python_import/c.json"]
    );

    let reconciliation = summary.reconciliation.as_ref().unwrap();
    assert_eq!(reconciliation.missing, vec!["b.json", "d.json"]);
    assert!(summary.failure.is_none());
    assert_eq!(summary.exit_code(), EXIT_INCOMPLETE);
}

#[tokio::test]
async fn test_dry_run_skips_upload_and_reconcile() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(two_record_archive())
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let store = Arc::new(ObjectStoreClient::in_memory());
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        store.clone(),
        no_shutdown(),
    )
    .unwrap();

    let options = RunOptions {
        dry_run: true,
        skip_reconcile: false,
    };
    let summary = coordinator.run(window(), options).await;

    assert!(summary.dry_run);
    assert_eq!(summary.documents, Some(2));
    assert!(summary.upload.is_none());
    assert!(summary.reconciliation.is_none());
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    assert!(store.list_keys("python_import").await.unwrap().is_empty());
    assert!(workspace_cleaned(parent.path()));
}

#[tokio::test]
async fn test_skip_reconcile() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(two_record_archive())
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let coordinator = PipelineCoordinator::with_store(
        test_config(&server.url(), parent.path()),
        Arc::new(ObjectStoreClient::in_memory()),
        no_shutdown(),
    )
    .unwrap();

    let options = RunOptions {
        dry_run: false,
        skip_reconcile: true,
    };
    let summary = coordinator.run(window(), options).await;

    assert_eq!(summary.uploaded(), 2);
    assert!(summary.reconciliation.is_none());
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
}

#[tokio::test]
async fn test_custom_prefix_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", EXPORT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(two_record_archive())
        .create_async()
        .await;

    let parent = TempDir::new().unwrap();
    let mut config = test_config(&server.url(), parent.path());
    config.storage.prefix = "/landing/amplitude/".to_string();
    let store = Arc::new(ObjectStoreClient::in_memory());
    let coordinator = PipelineCoordinator::with_store(config, store.clone(), no_shutdown()).unwrap();

    let summary = coordinator.run(window(), RunOptions::default()).await;

    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    assert_eq!(store.list_keys("landing/amplitude").await.unwrap().len(), 2);
}

#[test]
fn test_coordinator_rejects_s3_without_bucket() {
    let parent = TempDir::new().unwrap();
    let config = test_config("http://127.0.0.1:9", parent.path());
    assert!(config.storage.bucket.is_empty());

    let result = PipelineCoordinator::new(config, no_shutdown());
    assert!(result.is_err());
}
