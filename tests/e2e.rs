//! End-to-end scenarios: a manifest on disk, a mock registry, one run.

use std::sync::Arc;

use mockito::{Server, ServerGuard};
use tempfile::TempDir;

use npm_version_check::auth::Npmrc;
use npm_version_check::check;
use npm_version_check::config::RawInput;
use npm_version_check::error::{CheckError, RegistryError};
use npm_version_check::output::Tristate;
use npm_version_check::version::compare::ComparisonOutcome;

fn manifest_dir(body: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), body).unwrap();
    dir
}

fn input_for(dir: &TempDir, server: &ServerGuard) -> RawInput {
    RawInput {
        path: dir.path().display().to_string(),
        registry: Some(server.url()),
        ..RawInput::default()
    }
}

async fn run(input: RawInput) -> Result<npm_version_check::output::Outputs, CheckError> {
    let npmrc = Arc::new(Npmrc::parse(""));
    check::run(input, npmrc.clone(), npmrc).await
}

#[tokio::test]
async fn never_published_scoped_package_reports_unknown() {
    let dir = manifest_dir(r#"{"name": "@acme/widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/@acme%2Fwidget")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Not found"}"#)
        .create_async()
        .await;

    let outputs = run(input_for(&dir, &server)).await.unwrap();

    mock.assert_async().await;
    assert!(!outputs.is_published);
    assert_eq!(outputs.committed_version, "1.0.0");
    assert_eq!(outputs.retrieved_version, "NOT_FOUND");
    assert_eq!(outputs.is_committed_version_free, Tristate::True);
    assert_eq!(outputs.result, ComparisonOutcome::Unknown);
}

#[tokio::test]
async fn equality_check_against_the_latest_tag() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "dist-tags": {"latest": "1.0.0"},
                "versions": {"1.0.0": {}}
            }"#,
        )
        .create_async()
        .await;

    let outputs = run(RawInput {
        operator: Some("=".to_string()),
        ..input_for(&dir, &server)
    })
    .await
    .unwrap();

    assert!(outputs.is_published);
    assert_eq!(outputs.retrieved_version, "1.0.0");
    assert_eq!(outputs.result, ComparisonOutcome::True);
    // The committed version is in the published set, so it is not free.
    assert_eq!(outputs.is_committed_version_free, Tristate::False);
}

#[tokio::test]
async fn range_expression_selects_the_maximum_satisfying_version() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "dist-tags": {"latest": "2.0.0"},
                "versions": {"1.0.0": {}, "1.2.0": {}, "2.0.0": {}}
            }"#,
        )
        .create_async()
        .await;

    // "^1.0.0" is not valid semver, so the committed version still comes
    // from the manifest while the target expression is the range.
    let outputs = run(RawInput {
        version: Some("^1.0.0".to_string()),
        ..input_for(&dir, &server)
    })
    .await
    .unwrap();

    assert_eq!(outputs.retrieved_version, "1.2.0");
    // Default operator: selected > committed.
    assert_eq!(outputs.result, ComparisonOutcome::True);
}

#[tokio::test]
async fn already_ahead_of_the_registry_compares_false() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "2.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "dist-tags": {"latest": "1.9.0"},
                "versions": {"1.8.0": {}, "1.9.0": {}}
            }"#,
        )
        .create_async()
        .await;

    let outputs = run(input_for(&dir, &server)).await.unwrap();

    assert_eq!(outputs.retrieved_version, "1.9.0");
    assert_eq!(outputs.result, ComparisonOutcome::False);
    assert_eq!(outputs.is_committed_version_free, Tristate::True);
}

#[tokio::test]
async fn registry_error_body_aborts_the_run() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "you must be logged in to publish packages"}"#)
        .create_async()
        .await;

    let result = run(input_for(&dir, &server)).await;

    match result {
        Err(CheckError::Registry(RegistryError::Registry(message))) => {
            assert_eq!(message, "you must be logged in to publish packages");
        }
        other => panic!("expected a fatal registry error, got {other:?}"),
    }
}

#[tokio::test]
async fn explicit_token_reaches_the_registry_as_bearer_auth() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/widget")
        .match_header("authorization", "Bearer sekret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"dist-tags": {"latest": "1.0.0"}, "versions": {"1.0.0": {}}}"#)
        .create_async()
        .await;

    run(RawInput {
        token: Some("sekret".to_string()),
        ..input_for(&dir, &server)
    })
    .await
    .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn range_only_mode_skips_the_dist_tag() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "dist-tags": {"latest": "2.0.0"},
                "versions": {"1.0.0": {}, "2.0.0": {}}
            }"#,
        )
        .create_async()
        .await;

    // "latest" is a tag, not a range: with range-only resolution nothing
    // can be selected and the comparison is unknown.
    let outputs = run(RawInput {
        range: true,
        ..input_for(&dir, &server)
    })
    .await
    .unwrap();

    assert!(outputs.is_published);
    assert_eq!(outputs.retrieved_version, "NOT_FOUND");
    assert_eq!(outputs.result, ComparisonOutcome::Unknown);
}

#[tokio::test]
async fn metadata_without_versions_leaves_the_free_flag_unknown() {
    let dir = manifest_dir(r#"{"name": "widget", "version": "1.0.0"}"#);
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"dist-tags": {"latest": "2.0.0"}}"#)
        .create_async()
        .await;

    let outputs = run(input_for(&dir, &server)).await.unwrap();

    assert_eq!(outputs.retrieved_version, "2.0.0");
    assert_eq!(outputs.is_committed_version_free, Tristate::Unknown);
    assert_eq!(outputs.result, ComparisonOutcome::True);
}

#[tokio::test]
async fn missing_manifest_is_fatal() {
    let dir = TempDir::new().unwrap();
    let server = Server::new_async().await;

    let result = run(input_for(&dir, &server)).await;

    // The directory exists but contains no package.json.
    assert!(matches!(result, Err(CheckError::Manifest(_))));
}
