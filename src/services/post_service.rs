use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CreatePostRequest, Post, PostAuthor, PostResponse},
    services::ranking,
    utils,
};

const SUBMISSION_COOLDOWN_MINUTES: i64 = 10;
const DAILY_SUBMISSION_LIMIT: i64 = 5;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    url: String,
    domain: String,
    slug: Option<String>,
    author_id: Uuid,
    upvotes_count: i32,
    score: f64,
    created_at: DateTime<Utc>,
    username: String,
    has_upvoted: bool,
}

pub async fn get_post_by_id_raw(db: &PgPool, post_id: Uuid) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(db)
        .await?;

    Ok(post)
}

pub async fn get_post_by_id(
    db: &PgPool,
    post_id: Uuid,
    user_id: Option<Uuid>,
) -> Result<Option<PostResponse>> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT
            p.id, p.title, p.url, p.domain, p.slug, p.author_id,
            p.upvotes_count, p.score, p.created_at,
            u.username,
            CASE WHEN pu.id IS NOT NULL THEN TRUE ELSE FALSE END AS has_upvoted
        FROM posts p
        JOIN users u ON p.author_id = u.id
        LEFT JOIN post_upvotes pu ON p.id = pu.post_id AND pu.user_id = $2
        WHERE p.id = $1 AND p.is_deleted = FALSE
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| PostResponse {
        id: row.id,
        title: row.title,
        url: row.url,
        domain: row.domain,
        slug: row.slug,
        upvotes_count: row.upvotes_count,
        score: row.score,
        has_upvoted: row.has_upvoted,
        author: PostAuthor {
            id: row.author_id,
            username: row.username,
        },
        created_at: row.created_at,
    }))
}

pub async fn create_post(
    db: &PgPool,
    author_id: Uuid,
    payload: &CreatePostRequest,
) -> Result<PostResponse> {
    let domain = utils::extract_domain(&payload.url).ok_or_else(|| {
        AppError::Validation("URL must be a valid http or https link".to_string())
    })?;

    let duplicate =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE url = $1)")
            .bind(&payload.url)
            .fetch_one(db)
            .await?;

    if duplicate {
        return Err(AppError::Conflict(
            "This link has already been submitted".to_string(),
        ));
    }

    check_submission_throttle(db, author_id).await?;

    let slug = resolve_unique_slug(db, &payload.title).await?;

    let post_id = Uuid::new_v4();
    let now = Utc::now();
    let initial_score = ranking::compute_score(1, now, now);

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO posts (
            id, title, url, domain, slug, author_id,
            upvotes_count, score, is_deleted, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 1, $7, FALSE, $8, $8)
        "#,
    )
    .bind(post_id)
    .bind(&payload.title)
    .bind(&payload.url)
    .bind(&domain)
    .bind(&slug)
    .bind(author_id)
    .bind(initial_score)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // The submitter's upvote goes straight into the ledger so toggling it
    // off later works like any other vote.
    sqlx::query(
        "INSERT INTO post_upvotes (id, post_id, user_id, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(author_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET karma = karma + 1 WHERE id = $1")
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_post_by_id(db, post_id, Some(author_id))
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created post".to_string()))
}

pub async fn delete_post(db: &PgPool, post_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE posts SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(post_id)
        .execute(db)
        .await?;

    Ok(())
}

/// Both limits come from the posts table itself, so a restart never resets
/// them.
async fn check_submission_throttle(db: &PgPool, author_id: Uuid) -> Result<()> {
    let cooldown_cutoff = Utc::now() - Duration::minutes(SUBMISSION_COOLDOWN_MINUTES);
    let recently_posted = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE author_id = $1 AND created_at > $2)",
    )
    .bind(author_id)
    .bind(cooldown_cutoff)
    .fetch_one(db)
    .await?;

    if recently_posted {
        return Err(AppError::RateLimit(format!(
            "You can only submit a new link every {} minutes",
            SUBMISSION_COOLDOWN_MINUTES
        )));
    }

    let day_cutoff = Utc::now() - Duration::hours(24);
    let submitted_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND created_at > $2",
    )
    .bind(author_id)
    .bind(day_cutoff)
    .fetch_one(db)
    .await?;

    if submitted_today >= DAILY_SUBMISSION_LIMIT {
        return Err(AppError::RateLimit(
            "Daily submission limit reached".to_string(),
        ));
    }

    Ok(())
}

async fn resolve_unique_slug(db: &PgPool, title: &str) -> Result<String> {
    let base = utils::slugify(title);

    // Slugs are plain [a-z0-9-], so interpolating into LIKE is safe here.
    let taken: HashSet<String> =
        sqlx::query_scalar::<_, Option<String>>("SELECT slug FROM posts WHERE slug LIKE $1")
            .bind(format!("{}%", base))
            .fetch_all(db)
            .await?
            .into_iter()
            .flatten()
            .collect();

    Ok(utils::resolve_slug(&base, &taken))
}
