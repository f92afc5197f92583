use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CommentAuthor, CommentResponse, CreateCommentRequest},
};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    parent_id: Option<Uuid>,
    author_id: Uuid,
    content: String,
    likes_count: i32,
    created_at: DateTime<Utc>,
    username: String,
    has_liked: bool,
}

pub async fn get_comment_by_id_raw(db: &PgPool, comment_id: Uuid) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(db)
        .await?;

    Ok(comment)
}

pub async fn get_comment_by_id(
    db: &PgPool,
    comment_id: Uuid,
    viewer_id: Option<Uuid>,
) -> Result<Option<CommentResponse>> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT
            c.id, c.post_id, c.parent_id, c.author_id, c.content,
            c.likes_count, c.created_at,
            u.username,
            CASE WHEN cl.id IS NOT NULL THEN TRUE ELSE FALSE END AS has_liked
        FROM comments c
        JOIN users u ON c.author_id = u.id
        LEFT JOIN comment_likes cl ON c.id = cl.comment_id AND cl.user_id = $2
        WHERE c.id = $1 AND c.is_deleted = FALSE
        "#,
    )
    .bind(comment_id)
    .bind(viewer_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| CommentResponse {
        id: row.id,
        post_id: row.post_id,
        parent_id: row.parent_id,
        content: row.content,
        likes_count: row.likes_count,
        has_liked: row.has_liked,
        author: CommentAuthor {
            id: row.author_id,
            username: row.username,
        },
        created_at: row.created_at,
    }))
}

pub async fn create_comment(
    db: &PgPool,
    author_id: Uuid,
    payload: &CreateCommentRequest,
) -> Result<CommentResponse> {
    let post_deleted = sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM posts WHERE id = $1")
        .bind(payload.post_id)
        .fetch_optional(db)
        .await?;

    match post_deleted {
        None | Some(true) => {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        Some(false) => {}
    }

    if let Some(parent_id) = payload.parent_id {
        // A parent hanging off another post is treated as nonexistent.
        let parent = get_comment_by_id_raw(db, parent_id)
            .await?
            .filter(|parent| parent.post_id == payload.post_id)
            .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

        if parent.is_deleted {
            return Err(AppError::PreconditionFailed(
                "Parent comment has been deleted".to_string(),
            ));
        }
    }

    let comment_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO comments (
            id, post_id, parent_id, author_id, content,
            likes_count, is_deleted, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, 1, FALSE, $6, $6)
        "#,
    )
    .bind(comment_id)
    .bind(payload.post_id)
    .bind(payload.parent_id)
    .bind(author_id)
    .bind(&payload.content)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // Self-like mirrors the post self-upvote, but likes never move karma.
    sqlx::query(
        "INSERT INTO comment_likes (id, comment_id, user_id, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(comment_id)
    .bind(author_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_comment_by_id(db, comment_id, Some(author_id))
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created comment".to_string()))
}

pub async fn delete_comment(db: &PgPool, comment_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE comments SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(comment_id)
        .execute(db)
        .await?;

    Ok(())
}
