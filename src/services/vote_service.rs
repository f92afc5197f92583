use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{VoteKind, VoteResponse},
};

#[derive(sqlx::FromRow)]
struct ItemHead {
    author_id: Uuid,
    is_deleted: bool,
}

/// Toggles `user_id`'s vote on a post or comment.
///
/// Requests racing past the existence probe are absorbed rather than
/// double-counted: the add path leans on the ledger's unique (item, user)
/// constraint and the remove path on DELETE matching zero rows. Whichever
/// request loses the race rolls back and reports the count the winner left
/// behind.
pub async fn toggle_vote(
    db: &PgPool,
    kind: VoteKind,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<VoteResponse> {
    let head = sqlx::query_as::<_, ItemHead>(&format!(
        "SELECT author_id, is_deleted FROM {} WHERE id = $1",
        kind.item_table()
    ))
    .bind(item_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.noun())))?;

    if head.is_deleted {
        return Err(AppError::PreconditionFailed(format!(
            "{} has been deleted",
            kind.noun()
        )));
    }

    let already_voted = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND user_id = $2)",
        kind.ledger_table(),
        kind.item_column()
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    if already_voted {
        remove_vote(db, kind, item_id, user_id, head.author_id).await
    } else {
        add_vote(db, kind, item_id, user_id, head.author_id).await
    }
}

async fn add_vote(
    db: &PgPool,
    kind: VoteKind,
    item_id: Uuid,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<VoteResponse> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(&format!(
        r#"
        INSERT INTO {} (id, {}, user_id, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT ({}, user_id) DO NOTHING
        "#,
        kind.ledger_table(),
        kind.item_column(),
        kind.item_column()
    ))
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        // A concurrent request recorded this vote first, and the count and
        // karma moved with it.
        tx.rollback().await?;
        let count = current_count(db, kind, item_id).await?;
        return Ok(VoteResponse {
            voted: true,
            new_count: count,
        });
    }

    let new_count = sqlx::query_scalar::<_, i32>(&format!(
        "UPDATE {} SET {} = {} + 1 WHERE id = $1 RETURNING {}",
        kind.item_table(),
        kind.count_column(),
        kind.count_column(),
        kind.count_column()
    ))
    .bind(item_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET karma = karma + 1 WHERE id = $1")
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(VoteResponse {
        voted: true,
        new_count,
    })
}

async fn remove_vote(
    db: &PgPool,
    kind: VoteKind,
    item_id: Uuid,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<VoteResponse> {
    let mut tx = db.begin().await?;

    let deleted = sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
        kind.ledger_table(),
        kind.item_column()
    ))
    .bind(item_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if deleted.rows_affected() == 0 {
        // Already removed by a concurrent request; nothing to decrement.
        tx.rollback().await?;
        let count = current_count(db, kind, item_id).await?;
        return Ok(VoteResponse {
            voted: false,
            new_count: count,
        });
    }

    let new_count = sqlx::query_scalar::<_, i32>(&format!(
        "UPDATE {} SET {} = GREATEST({} - 1, 0) WHERE id = $1 RETURNING {}",
        kind.item_table(),
        kind.count_column(),
        kind.count_column(),
        kind.count_column()
    ))
    .bind(item_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET karma = GREATEST(karma - 1, 0) WHERE id = $1")
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(VoteResponse {
        voted: false,
        new_count,
    })
}

async fn current_count(db: &PgPool, kind: VoteKind, item_id: Uuid) -> Result<i32> {
    let count = sqlx::query_scalar::<_, i32>(&format!(
        "SELECT {} FROM {} WHERE id = $1",
        kind.count_column(),
        kind.item_table()
    ))
    .bind(item_id)
    .fetch_one(db)
    .await?;

    Ok(count)
}
