//! HTTP-level integration tests for the media endpoints.
//!
//! Requests go straight to the router through `tower::ServiceExt`, backed by
//! in-memory storage.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{body_json, get, post_json, put_json, token};
use mediavault_core::media::CONCURRENCY_MESSAGE;
use serde_json::{json, Value};

const EDITOR: i64 = 5;

fn image_body(locator: &str) -> Value {
    json!({ "bundle": "image", "fields": { "image": locator } })
}

/// Create an image as `EDITOR` and return its id.
async fn create_image(app: axum::Router) -> i64 {
    let response = post_json(
        app,
        "/api/v1/media",
        &token(EDITOR, "editor"),
        image_body("public://harbour.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn fetch(app: axum::Router, id: i64) -> Value {
    let response = get(app, &format!("/api/v1/media/{id}"), Some(token(EDITOR, "editor"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Authentication and authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/api/v1/bundles", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn viewers_cannot_submit_media() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/media",
        &token(2, "viewer"),
        image_body("public://harbour.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn bundles_are_listed() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/api/v1/bundles", Some(token(2, "viewer"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["document", "image"]);
    assert_eq!(json["data"][0]["source_fields"], json!([]));
    assert_eq!(
        json["data"][1]["source_fields"],
        json!(["filename", "extension", "mime"])
    );
    assert_eq!(json["data"][1]["type_plugin"], "image");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_image_derives_name_mime_and_thumbnail() {
    let (app, storage) = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/media",
        &token(EDITOR, "editor"),
        image_body("public://harbour.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = body_json(response).await["data"].clone();
    let id = data["id"].as_i64().unwrap();
    assert!(data["revision_id"].is_number());
    assert_eq!(data["redirect"], format!("/media/{id}"));

    let media = fetch(app, id).await;
    assert_eq!(media["name"], "harbour.png");
    assert_eq!(media["fields"]["mime_type"], "image/png");
    assert_eq!(media["publisher_id"], EDITOR);
    assert_eq!(media["published"], true);
    assert_eq!(media["thumbnail"]["alt"], "Thumbnail");
    assert_eq!(storage.artifact_count(), 1);
}

#[tokio::test]
async fn same_thumbnail_locator_reuses_artifact() {
    let (app, storage) = common::build_test_app();
    create_image(app.clone()).await;
    create_image(app).await;
    assert_eq!(storage.artifact_count(), 1);
}

#[tokio::test]
async fn document_uses_configured_icon() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/media",
        &token(EDITOR, "editor"),
        json!({ "bundle": "document", "name": "Annual report" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let media = fetch(app, id).await;
    assert_eq!(media["name"], "Annual report");
    assert!(media["thumbnail"]["target_id"].is_number());
}

#[tokio::test]
async fn invalid_image_is_rejected_with_field_errors() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/media",
        &token(EDITOR, "editor"),
        image_body("public://notes.txt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"][0]["field"], "image");
}

#[tokio::test]
async fn unknown_bundle_is_a_bad_request() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/media",
        &token(EDITOR, "editor"),
        json!({ "bundle": "podcast" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn media_the_author_cannot_view_redirects_to_front() {
    let (app, _) = common::build_test_app();
    let mut body = image_body("public://harbour.png");
    body["published"] = json!(false);
    body["publisher_id"] = json!(9);

    let response = post_json(app, "/api/v1/media", &token(EDITOR, "editor"), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["redirect"], "/");
}

#[tokio::test]
async fn persist_failure_asks_client_to_rebuild() {
    let (app, storage) = common::build_test_app();
    storage.fail_persist(true);

    let response = post_json(
        app,
        "/api/v1/media",
        &token(EDITOR, "editor"),
        image_body("public://harbour.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "SAVE_FAILED");
    assert_eq!(json["error"], "The media could not be saved.");
    assert_eq!(json["rebuild"], true);
}

#[tokio::test]
async fn unnamed_document_is_rejected() {
    let (app, storage) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/media",
        &token(EDITOR, "editor"),
        json!({ "bundle": "document" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"][0]["field"], "name");
    assert_eq!(json["errors"][0]["message"], "Name field is required.");
    assert_eq!(storage.artifact_count(), 0);
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_edit_returns_conflict() {
    let (app, _) = common::build_test_app();
    let id = create_image(app.clone()).await;
    let media = fetch(app.clone(), id).await;

    let loaded: DateTime<Utc> = media["changed_at"].as_str().unwrap().parse().unwrap();
    let stale = loaded - Duration::hours(1);

    let response = put_json(
        app.clone(),
        &format!("/api/v1/media/{id}"),
        &token(EDITOR, "editor"),
        json!({ "name": "Stale", "changed": stale }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], CONCURRENCY_MESSAGE);
    assert_eq!(json["errors"][0]["field"], "changed");
    assert_eq!(fetch(app, id).await["name"], "harbour.png");
}

#[tokio::test]
async fn edit_with_current_token_updates_in_place() {
    let (app, storage) = common::build_test_app();
    let id = create_image(app.clone()).await;
    let media = fetch(app.clone(), id).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/media/{id}"),
        &token(EDITOR, "editor"),
        json!({ "name": "Harbour", "changed": media["changed_at"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["revision_id"], media["revision_id"]);
    assert_eq!(fetch(app, id).await["name"], "Harbour");
    assert_eq!(storage.revision_count(id), 1);
}

#[tokio::test]
async fn requested_revision_is_listed_in_history() {
    let (app, _) = common::build_test_app();
    let id = create_image(app.clone()).await;
    let media = fetch(app.clone(), id).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/media/{id}"),
        &token(7, "editor"),
        json!({
            "changed": media["changed_at"],
            "revision": true,
            "revision_log": "Cropped",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert!(data["revision_id"].as_i64() > media["revision_id"].as_i64());

    let response = get(
        app,
        &format!("/api/v1/media/{id}/revisions"),
        Some(token(EDITOR, "editor")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let revisions = body_json(response).await["data"].clone();
    assert_eq!(revisions.as_array().unwrap().len(), 2);
    assert_eq!(revisions[0]["is_current"], true);
    assert_eq!(revisions[0]["revision_author_id"], 7);
    assert_eq!(revisions[0]["revision_log"], "Cropped");
    assert_eq!(revisions[1]["revision_author_id"], EDITOR);
}

#[tokio::test]
async fn edit_without_token_is_rejected() {
    let (app, storage) = common::build_test_app();
    let id = create_image(app.clone()).await;
    let media = fetch(app.clone(), id).await;
    let loaded: DateTime<Utc> = media["changed_at"].as_str().unwrap().parse().unwrap();
    storage.touch(id, loaded + Duration::hours(1));

    let response = put_json(
        app.clone(),
        &format!("/api/v1/media/{id}"),
        &token(EDITOR, "editor"),
        json!({ "name": "Blind overwrite" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = post_json(
        app.clone(),
        &format!("/api/v1/media/{id}/validate"),
        &token(EDITOR, "editor"),
        json!({ "name": "Blind overwrite" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetch(app, id).await["name"], "harbour.png");
}

#[tokio::test]
async fn editing_missing_media_returns_404() {
    let (app, _) = common::build_test_app();
    let response = put_json(
        app,
        "/api/v1/media/404",
        &token(EDITOR, "editor"),
        json!({ "name": "Ghost" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Validation dry runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_new_reports_without_saving() {
    let (app, storage) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/media/validate",
        &token(EDITOR, "editor"),
        image_body("public://notes.txt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], false);
    assert_eq!(json["data"]["errors"][0]["field"], "image");
    assert_eq!(storage.artifact_count(), 0);
}

#[tokio::test]
async fn validate_existing_flags_stale_token() {
    let (app, _) = common::build_test_app();
    let id = create_image(app.clone()).await;

    let response = post_json(
        app,
        &format!("/api/v1/media/{id}/validate"),
        &token(EDITOR, "editor"),
        json!({ "changed": "2000-01-01T00:00:00Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], false);
    assert_eq!(json["data"]["errors"][0]["field"], "changed");
}

// ---------------------------------------------------------------------------
// View access
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unpublished_media_is_hidden_from_viewers() {
    let (app, _) = common::build_test_app();
    let mut body = image_body("public://harbour.png");
    body["published"] = json!(false);
    let response = post_json(app.clone(), "/api/v1/media", &token(EDITOR, "editor"), body).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get(app.clone(), &format!("/api/v1/media/{id}"), Some(token(2, "viewer"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(app, &format!("/api/v1/media/{id}"), Some(token(1, "admin"))).await;
    assert_eq!(response.status(), StatusCode::OK);
}
