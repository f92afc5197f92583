#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Seeds a user the way the auth service would.
pub async fn create_user(pool: &PgPool, email_verified: bool) -> Uuid {
    let id = Uuid::new_v4();
    let tag = id.simple().to_string();

    sqlx::query("INSERT INTO users (id, username, email, email_verified) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("user_{}", &tag[..8]))
        .bind(format!("{}@example.com", &tag[..8]))
        .bind(email_verified)
        .execute(pool)
        .await
        .unwrap();

    id
}

/// Inserts a post row directly, bypassing the submission pipeline, so tests
/// can control `created_at` and the starting count.
pub async fn create_post_at(
    pool: &PgPool,
    author_id: Uuid,
    upvotes_count: i32,
    created_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO posts (
            id, title, url, domain, author_id, upvotes_count, score, created_at, updated_at
        )
        VALUES ($1, $2, $3, 'example.com', $4, $5, 0, $6, $6)
        "#,
    )
    .bind(id)
    .bind(format!("Post {}", id.simple()))
    .bind(format!("https://example.com/{}", id.simple()))
    .bind(author_id)
    .bind(upvotes_count)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();

    id
}

pub async fn create_post(pool: &PgPool, author_id: Uuid, upvotes_count: i32) -> Uuid {
    create_post_at(pool, author_id, upvotes_count, Utc::now()).await
}

pub async fn create_comment(pool: &PgPool, post_id: Uuid, author_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO comments (id, post_id, author_id, content) VALUES ($1, $2, $3, 'test comment')",
    )
    .bind(id)
    .bind(post_id)
    .bind(author_id)
    .execute(pool)
    .await
    .unwrap();

    id
}

pub async fn post_upvotes_count(pool: &PgPool, post_id: Uuid) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT upvotes_count FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn post_ledger_rows(pool: &PgPool, post_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_upvotes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn comment_likes_count(pool: &PgPool, comment_id: Uuid) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT likes_count FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn comment_ledger_rows(pool: &PgPool, comment_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
        .bind(comment_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn user_karma(pool: &PgPool, user_id: Uuid) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT karma FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn post_score(pool: &PgPool, post_id: Uuid) -> f64 {
    sqlx::query_scalar::<_, f64>("SELECT score FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn set_post_score(pool: &PgPool, post_id: Uuid, score: f64) {
    sqlx::query("UPDATE posts SET score = $2 WHERE id = $1")
        .bind(post_id)
        .bind(score)
        .execute(pool)
        .await
        .unwrap();
}
