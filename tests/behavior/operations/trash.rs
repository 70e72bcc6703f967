use crate::*;
use gdrive_model::drive::TrashMode;
use gdrive_model::error::{Error, Result};
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_trash_processes_files_in_order,
        test_trash_stops_at_first_failure,
        test_delete_failure_names_deleting,
        test_delete_returns_no_descriptors,
        test_trash_authorization_failure_sends_nothing,
        test_trash_cancelled_before_start,
        test_trash_cancelled_mid_batch_skips_remaining_files,
        test_delete_keeps_slashes_inside_file_id,
        test_trash_empty_batch
    ));
}

async fn mount_trash(harness: &DriveHarness, file_id: &str, expected_calls: u64) {
    Mock::given(method("PATCH"))
        .and(path(format!("/drive/v3/files/{file_id}")))
        .and(query_param("fields", "id,trashed"))
        .and(body_json(json!({"trashed": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": file_id, "trashed": true})),
        )
        .expect(expected_calls)
        .mount(&harness.server)
        .await;
}

async fn test_trash_processes_files_in_order() -> Result<()> {
    let harness = DriveHarness::start().await;
    let ids: Vec<String> = (0..3).map(|_| TEST_FIXTURE.new_file_id()).collect();
    for id in &ids {
        mount_trash(&harness, id, 1).await;
    }

    let results = harness.client.trash_files(&ids, TrashMode::Trash).await?;

    assert_eq!(results.len(), 3);
    for (id, result) in ids.iter().zip(&results) {
        let file = result.as_ref().expect("trash returns a descriptor");
        assert_eq!(file.id.as_deref(), Some(id.as_str()));
        assert_eq!(file.trashed, Some(true));
    }

    let requested: Vec<String> = harness
        .requests()
        .await
        .iter()
        .map(|r| r.url.path().rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(requested, ids);
    harness.server.verify().await;
    Ok(())
}

async fn test_trash_stops_at_first_failure() -> Result<()> {
    let harness = DriveHarness::start().await;
    let (a, b, c) = (
        TEST_FIXTURE.new_file_id(),
        TEST_FIXTURE.new_file_id(),
        TEST_FIXTURE.new_file_id(),
    );
    mount_trash(&harness, &a, 1).await;
    Mock::given(method("PATCH"))
        .and(path(format!("/drive/v3/files/{b}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "The user does not have sufficient permissions for this file."}
        })))
        .expect(1)
        .mount(&harness.server)
        .await;
    mount_trash(&harness, &c, 0).await;

    let err = harness
        .client
        .trash_files(&[a, b.clone(), c], TrashMode::Trash)
        .await
        .unwrap_err();

    match &err {
        Error::BatchStepFailed {
            action,
            file_id,
            source,
        } => {
            assert_eq!(action, "trashing");
            assert_eq!(file_id, &b);
            assert!(matches!(
                source.as_ref(),
                Error::RemoteService { status: 403, .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains(&format!("trashing file {b}")), "{message}");
    assert!(message.contains("sufficient permissions"), "{message}");
    harness.server.verify().await;
    Ok(())
}

async fn test_delete_failure_names_deleting() -> Result<()> {
    let harness = DriveHarness::start().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/locked"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&harness.server)
        .await;

    let err = harness
        .client
        .trash_files(&["locked".to_string()], TrashMode::Delete)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, Error::BatchStepFailed { action, file_id, .. }
            if action == "deleting" && file_id == "locked"),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains("backend error"));
    Ok(())
}

async fn test_delete_returns_no_descriptors() -> Result<()> {
    let harness = DriveHarness::start().await;
    let file_id = TEST_FIXTURE.new_file_id();

    Mock::given(method("DELETE"))
        .and(path(format!("/drive/v3/files/{file_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&harness.server)
        .await;

    let results = harness
        .client
        .trash_files(&[file_id], TrashMode::Delete)
        .await?;

    assert_eq!(results, vec![None]);
    harness.server.verify().await;
    Ok(())
}

async fn test_trash_authorization_failure_sends_nothing() -> Result<()> {
    let harness = DriveHarness::with_failing_auth().await;

    let err = harness
        .client
        .trash_files(&["x".to_string(), "y".to_string()], TrashMode::Trash)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::AuthorizationFailed { .. }),
        "unexpected error: {err}"
    );
    assert_eq!(harness.authorizer.calls(), 1);
    assert!(harness.requests().await.is_empty());
    Ok(())
}

async fn test_trash_cancelled_before_start() -> Result<()> {
    let harness = DriveHarness::start().await;
    let (_tx, rx) = watch::channel(true);
    let client = harness.client.clone().with_cancel(rx);

    let err = client
        .trash_files(&["x".to_string()], TrashMode::Trash)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "unexpected error: {err}");
    assert_eq!(harness.authorizer.calls(), 0);
    assert!(harness.requests().await.is_empty());
    Ok(())
}

async fn test_trash_cancelled_mid_batch_skips_remaining_files() -> Result<()> {
    let harness = DriveHarness::start().await;
    let (first, second) = (TEST_FIXTURE.new_file_id(), TEST_FIXTURE.new_file_id());
    let (tx, rx) = watch::channel(false);
    let client = harness.client.clone().with_cancel(rx);

    // Cancellation is raised while the first file is being trashed.
    let first_body = json!({"id": first, "trashed": true});
    Mock::given(method("PATCH"))
        .and(path(format!("/drive/v3/files/{first}")))
        .respond_with(move |_: &Request| {
            let _ = tx.send(true);
            ResponseTemplate::new(200).set_body_json(first_body.clone())
        })
        .expect(1)
        .mount(&harness.server)
        .await;
    mount_trash(&harness, &second, 0).await;

    let err = client
        .trash_files(&[first, second], TrashMode::Trash)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "unexpected error: {err}");
    assert_eq!(harness.requests().await.len(), 1);
    harness.server.verify().await;
    Ok(())
}

async fn test_delete_keeps_slashes_inside_file_id() -> Result<()> {
    let harness = DriveHarness::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&harness.server)
        .await;

    let results = harness
        .client
        .trash_files(
            &["abc/permissions/p1".to_string(), "../../v2/about".to_string()],
            TrashMode::Delete,
        )
        .await?;

    assert_eq!(results, vec![None, None]);
    let paths: Vec<String> = harness
        .requests()
        .await
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        [
            "/drive/v3/files/abc%2Fpermissions%2Fp1",
            "/drive/v3/files/..%2F..%2Fv2%2Fabout"
        ]
    );
    Ok(())
}

async fn test_trash_empty_batch() -> Result<()> {
    let harness = DriveHarness::start().await;

    let results = harness.client.trash_files(&[], TrashMode::Trash).await?;

    assert!(results.is_empty());
    assert_eq!(harness.authorizer.calls(), 0);
    Ok(())
}
