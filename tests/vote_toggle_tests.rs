//! Vote toggle tests against a real Postgres database.
//!
//! Run with: `cargo test --test vote_toggle_tests`

mod common;

use linkboard::error::AppError;
use linkboard::models::VoteKind;
use linkboard::services::{post_service, vote_service};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test]
async fn test_toggle_adds_then_removes_a_vote(pool: PgPool) {
    let author = common::create_user(&pool, true).await;
    let voter = common::create_user(&pool, true).await;
    let post_id = common::create_post(&pool, author, 0).await;

    let on = vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter)
        .await
        .unwrap();
    assert!(on.voted);
    assert_eq!(on.new_count, 1);
    assert_eq!(common::post_ledger_rows(&pool, post_id).await, 1);
    assert_eq!(common::user_karma(&pool, author).await, 1);

    let off = vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter)
        .await
        .unwrap();
    assert!(!off.voted);
    assert_eq!(off.new_count, 0);
    assert_eq!(common::post_ledger_rows(&pool, post_id).await, 0);
    assert_eq!(common::user_karma(&pool, author).await, 0);
}

#[sqlx::test]
async fn test_concurrent_toggles_never_double_count(pool: PgPool) {
    let author = common::create_user(&pool, true).await;
    let post_id = common::create_post(&pool, author, 0).await;

    // Each voter fires two toggles at once. Whatever the interleaving, the
    // denormalized count, the ledger, and the author's karma must agree.
    for _ in 0..10 {
        let voter = common::create_user(&pool, true).await;

        let first = tokio::spawn({
            let pool = pool.clone();
            async move { vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter).await }
        });
        let second = tokio::spawn({
            let pool = pool.clone();
            async move { vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter).await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
    }

    let count = common::post_upvotes_count(&pool, post_id).await;
    let ledger = common::post_ledger_rows(&pool, post_id).await;

    assert_eq!(count as i64, ledger);
    assert_eq!(common::user_karma(&pool, author).await as i64, ledger);
}

#[sqlx::test]
async fn test_vote_on_missing_item_is_not_found(pool: PgPool) {
    let voter = common::create_user(&pool, true).await;

    let result = vote_service::toggle_vote(&pool, VoteKind::Post, Uuid::new_v4(), voter).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}

#[sqlx::test]
async fn test_vote_on_deleted_item_is_rejected(pool: PgPool) {
    let author = common::create_user(&pool, true).await;
    let voter = common::create_user(&pool, true).await;
    let post_id = common::create_post(&pool, author, 0).await;

    post_service::delete_post(&pool, post_id).await.unwrap();

    let result = vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter).await;

    assert!(matches!(
        result.unwrap_err(),
        AppError::PreconditionFailed(_)
    ));
}

#[sqlx::test]
async fn test_comment_like_round_trip_moves_comment_author_karma(pool: PgPool) {
    let post_author = common::create_user(&pool, true).await;
    let comment_author = common::create_user(&pool, true).await;
    let liker = common::create_user(&pool, true).await;
    let post_id = common::create_post(&pool, post_author, 0).await;
    let comment_id = common::create_comment(&pool, post_id, comment_author).await;

    let on = vote_service::toggle_vote(&pool, VoteKind::Comment, comment_id, liker)
        .await
        .unwrap();
    assert!(on.voted);
    assert_eq!(on.new_count, 1);
    assert_eq!(common::comment_ledger_rows(&pool, comment_id).await, 1);
    // Karma lands on the comment's author, not the post's
    assert_eq!(common::user_karma(&pool, comment_author).await, 1);
    assert_eq!(common::user_karma(&pool, post_author).await, 0);

    let off = vote_service::toggle_vote(&pool, VoteKind::Comment, comment_id, liker)
        .await
        .unwrap();
    assert!(!off.voted);
    assert_eq!(off.new_count, 0);
    assert_eq!(common::user_karma(&pool, comment_author).await, 0);
}

#[sqlx::test]
async fn test_count_decrement_floors_at_zero(pool: PgPool) {
    let author = common::create_user(&pool, true).await;
    let voter = common::create_user(&pool, true).await;
    // Ledger row exists but the denormalized count was left at zero
    let post_id = common::create_post(&pool, author, 0).await;
    sqlx::query("INSERT INTO post_upvotes (post_id, user_id) VALUES ($1, $2)")
        .bind(post_id)
        .bind(voter)
        .execute(&pool)
        .await
        .unwrap();

    let off = vote_service::toggle_vote(&pool, VoteKind::Post, post_id, voter)
        .await
        .unwrap();

    assert!(!off.voted);
    assert_eq!(off.new_count, 0);
    // The karma decrement is floored the same way
    assert_eq!(common::user_karma(&pool, author).await, 0);
}
