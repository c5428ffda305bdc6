//! HTTP-level integration tests for the visitor-facing `/public/forms`
//! endpoints.

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::{
    body_json, body_text, build_test_app, build_test_app_with_assets, create_user, get, get_auth,
    post_auth, post_json, post_json_auth, put_json_auth, TEST_APP_URL,
};
use serde_json::json;
use sqlx::PgPool;

/// Create a published form with a group holding one question, plus an
/// empty group. Returns `(token, form uuid, question uuid)`.
async fn published_form(pool: &PgPool) -> (String, String, String) {
    let (_, token) = create_user(pool, "owner@example.com").await;

    let app = build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/forms", json!({ "name": "Visitor Survey" }), &token).await;
    let form = body_json(response).await["data"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let blocks = format!("/api/v1/forms/{form}/blocks");
    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, &blocks, json!({ "block_type": "group" }), &token).await;
    let group = body_json(response).await["data"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &blocks,
        json!({ "block_type": "short_text", "parent_block": group, "title": "Name?" }),
        &token,
    )
    .await;
    let question = body_json(response).await["data"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("{blocks}/{question}/interactions"),
        json!({ "interaction_type": "input", "label": "Your name" }),
        &token,
    )
    .await;

    let app = build_test_app(pool.clone());
    post_json_auth(app, &blocks, json!({ "block_type": "group" }), &token).await;

    let app = build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/forms/{form}/publish"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    (token, form, question)
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_form_is_not_public(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner@example.com").await;
    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/forms", json!({ "name": "Draft" }), &token).await;
    let uuid = body_json(response).await["data"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/public/forms/{uuid}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/v1/public/forms/{uuid}/settings.js")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unpublished_and_trashed_forms_disappear(pool: PgPool) {
    let (token, form, _) = published_form(&pool).await;
    let public = format!("/api/v1/public/forms/{form}");

    let app = build_test_app(pool.clone());
    assert_eq!(get(app, &public).await.status(), StatusCode::OK);

    let app = build_test_app(pool.clone());
    post_auth(app, &format!("/api/v1/forms/{form}/unpublish"), &token).await;
    let app = build_test_app(pool.clone());
    assert_eq!(get(app, &public).await.status(), StatusCode::NOT_FOUND);

    let app = build_test_app(pool.clone());
    post_auth(app, &format!("/api/v1/forms/{form}/publish"), &token).await;
    let app = build_test_app(pool.clone());
    common::delete_auth(app, &format!("/api/v1/forms/{form}"), &token).await;
    let app = build_test_app(pool);
    assert_eq!(get(app, &public).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Public view
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_view_resolves_storyboard(pool: PgPool) {
    let (_, form, question) = published_form(&pool).await;

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/v1/public/forms/{form}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["name"], "Visitor Survey");
    assert_eq!(data["company_name"], "Acme");
    assert_eq!(data["active_privacy_link"], "https://acme.test/privacy");
    assert!(data.get("user_id").is_none());
    assert!(data.get("id").is_none());

    let board = &data["storyboard"];
    assert_eq!(board["count"], 2);
    let blocks = board["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["block_type"], "group");
    assert_eq!(blocks[1]["uuid"], question.as_str());
    assert_eq!(blocks[1]["interactions"][0]["label"], "Your name");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_avatar_url_requires_stored_asset(pool: PgPool) {
    let (token, form, _) = published_form(&pool).await;

    let app = build_test_app(pool.clone());
    put_json_auth(
        app,
        &format!("/api/v1/forms/{form}"),
        json!({ "settings": { "avatar_path": "avatars/logo.png" } }),
        &token,
    )
    .await;

    let app = build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/public/forms/{form}")).await;
    assert!(body_json(response).await["data"]["avatar"].is_null());

    let app = build_test_app_with_assets(pool, &["avatars/logo.png"]);
    let response = get(app, &format!("/api/v1/public/forms/{form}")).await;
    assert_eq!(
        body_json(response).await["data"]["avatar"],
        format!("{TEST_APP_URL}/images/avatars/logo.png")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_script(pool: PgPool) {
    let (_, form, _) = published_form(&pool).await;

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/v1/public/forms/{form}/settings.js")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/javascript"
    );

    let prefix = "window.iptSettings = window.iptSettings || [];window.iptSettings = ";
    let script = body_text(response).await;
    assert!(script.starts_with(prefix));

    let settings: serde_json::Value = serde_json::from_str(&script[prefix.len()..]).unwrap();
    assert_eq!(settings["uuid"], form.as_str());
    assert_eq!(settings["storyboard"]["count"], 2);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_flow_feeds_metrics(pool: PgPool) {
    let (token, form, question) = published_form(&pool).await;
    let sessions = format!("/api/v1/public/forms/{form}/sessions");

    let mut tokens = Vec::new();
    for _ in 0..2 {
        let app = build_test_app(pool.clone());
        let response = post_json(app, &sessions, json!({ "params": { "ref": "mail" } })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["is_completed"], false);
        tokens.push(json["data"]["session"].as_str().unwrap().to_string());
    }

    for session in &tokens {
        let app = build_test_app(pool.clone());
        let response = post_json(
            app,
            &format!("{sessions}/{session}/responses"),
            json!({ "block": question, "value": "Ada" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = build_test_app(pool.clone());
    let response = post_json(app, &format!("{sessions}/{}/complete", tokens[0]), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_completed"], true);

    // Started but never answered: not counted.
    let app = build_test_app(pool.clone());
    post_json(app, &sessions, json!({})).await;

    let app = build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/forms/{form}/metrics"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_sessions"], 2);
    assert_eq!(json["data"]["completed_sessions"], 1);
    assert_eq!(json["data"]["completion_rate"], 50.0);
    assert_eq!(json["data"]["sessions_this_month"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_response_to_unknown_block_is_rejected(pool: PgPool) {
    let (_, form, _) = published_form(&pool).await;
    let sessions = format!("/api/v1/public/forms/{form}/sessions");

    let app = build_test_app(pool.clone());
    let response = post_json(app, &sessions, json!({})).await;
    let session = body_json(response).await["data"]["session"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app(pool);
    let response = post_json(
        app,
        &format!("{sessions}/{session}/responses"),
        json!({ "block": "not-a-block", "value": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_is_scoped_to_its_form(pool: PgPool) {
    let (token, form, _) = published_form(&pool).await;

    let app = build_test_app(pool.clone());
    let response = post_json(app, &format!("/api/v1/public/forms/{form}/sessions"), json!({})).await;
    let session = body_json(response).await["data"]["session"]
        .as_str()
        .unwrap()
        .to_string();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/forms", json!({ "name": "Other" }), &token).await;
    let other = body_json(response).await["data"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();
    let app = build_test_app(pool.clone());
    post_auth(app, &format!("/api/v1/forms/{other}/publish"), &token).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/public/forms/{other}/sessions/{session}/complete"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
