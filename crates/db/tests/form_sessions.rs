//! Integration tests for session recording and counting.

use formkit_core::sessions;
use formkit_core::short_id::ShortIdCodec;
use formkit_db::models::form::CreateForm;
use formkit_db::models::form_block::CreateFormBlock;
use formkit_db::models::form_session::CreateFormSessionResponse;
use formkit_db::models::user::CreateUser;
use formkit_db::repositories::{FormBlockRepo, FormRepo, FormSessionRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a form with `blocks` plain blocks; returns (form id, block ids).
async fn seed_form(pool: &PgPool, email: &str, blocks: usize) -> (i64, Vec<i64>) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Owner".to_string(),
            email: email.to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let form = FormRepo::create(
        pool,
        &CreateForm {
            user_id: user.id,
            team_id: None,
            name: "Survey".to_string(),
        },
        &ShortIdCodec::default(),
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for _ in 0..blocks {
        let block = FormBlockRepo::create(
            pool,
            form.id,
            &CreateFormBlock {
                block_type: "short_text".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ids.push(block.id);
    }
    (form.id, ids)
}

async fn answer(pool: &PgPool, session: &str, block_id: i64) {
    FormSessionRepo::record_response(
        pool,
        &CreateFormSessionResponse {
            session: session.to_string(),
            form_block_id: block_id,
            value: Some(serde_json::json!("yes")),
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sessions_are_counted_once_across_blocks(pool: PgPool) {
    let (form_id, blocks) = seed_form(&pool, "owner@example.com", 2).await;

    let a = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
    let b = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
    answer(&pool, &a.session, blocks[0]).await;
    answer(&pool, &a.session, blocks[1]).await;
    answer(&pool, &b.session, blocks[0]).await;

    assert_eq!(
        FormSessionRepo::count_distinct_sessions(&pool, &blocks).await.unwrap(),
        2
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_is_counted_per_session(pool: PgPool) {
    let (form_id, blocks) = seed_form(&pool, "owner@example.com", 1).await;

    let mut tokens = Vec::new();
    for _ in 0..3 {
        let s = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
        answer(&pool, &s.session, blocks[0]).await;
        tokens.push(s.session);
    }
    let completed = FormSessionRepo::complete(&pool, &tokens[0]).await.unwrap().unwrap();
    assert!(completed.is_completed);

    let metrics = FormSessionRepo::metrics(&pool, &blocks).await.unwrap();
    assert_eq!(metrics.total_sessions, 3);
    assert_eq!(metrics.completed_sessions, 1);
    assert_eq!(metrics.completion_rate, 33.33);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sessions_without_responses_are_invisible(pool: PgPool) {
    let (form_id, blocks) = seed_form(&pool, "owner@example.com", 1).await;

    let idle = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
    FormSessionRepo::complete(&pool, &idle.session).await.unwrap();

    let metrics = FormSessionRepo::metrics(&pool, &blocks).await.unwrap();
    assert_eq!(metrics.total_sessions, 0);
    assert_eq!(metrics.completed_sessions, 0);
    assert_eq!(metrics.completion_rate, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_forms_do_not_leak_into_counts(pool: PgPool) {
    let (form_a, blocks_a) = seed_form(&pool, "a@example.com", 1).await;
    let (form_b, blocks_b) = seed_form(&pool, "b@example.com", 1).await;

    let s = FormSessionRepo::start(&pool, form_a, None).await.unwrap();
    answer(&pool, &s.session, blocks_a[0]).await;
    let t = FormSessionRepo::start(&pool, form_b, None).await.unwrap();
    answer(&pool, &t.session, blocks_b[0]).await;
    FormSessionRepo::complete(&pool, &t.session).await.unwrap();

    let a = FormSessionRepo::metrics(&pool, &blocks_a).await.unwrap();
    assert_eq!((a.total_sessions, a.completed_sessions), (1, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn monthly_count_uses_calendar_month(pool: PgPool) {
    let (form_id, blocks) = seed_form(&pool, "owner@example.com", 1).await;

    let current = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
    answer(&pool, &current.session, blocks[0]).await;

    let old = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
    answer(&pool, &old.session, blocks[0]).await;
    sqlx::query(
        "UPDATE form_session_responses SET created_at = NOW() - INTERVAL '2 months'
         WHERE session = $1",
    )
    .bind(&old.session)
    .execute(&pool)
    .await
    .unwrap();

    let now = chrono::Utc::now();
    let counts = FormSessionRepo::counts(&pool, &blocks, now).await.unwrap();
    assert_eq!(counts.total_sessions, 2);
    assert_eq!(counts.sessions_this_month, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sql_counts_agree_with_in_memory_aggregation(pool: PgPool) {
    let (form_id, blocks) = seed_form(&pool, "owner@example.com", 2).await;

    for i in 0..4 {
        let s = FormSessionRepo::start(&pool, form_id, None).await.unwrap();
        answer(&pool, &s.session, blocks[i % 2]).await;
        if i % 2 == 0 {
            FormSessionRepo::complete(&pool, &s.session).await.unwrap();
        }
    }

    let events = FormSessionRepo::list_response_events(&pool, &blocks)
        .await
        .unwrap();
    let expected = sessions::aggregate(&events, &blocks);
    let actual = FormSessionRepo::metrics(&pool, &blocks).await.unwrap();

    assert_eq!(actual, expected);
    assert_eq!(actual.completion_rate, 50.0);
}
