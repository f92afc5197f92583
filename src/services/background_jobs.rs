use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::time::{Duration, interval};
use uuid::Uuid;

use crate::{error::Result, services::ranking};

#[derive(Clone)]
pub struct BackgroundJobsService {
    db: PgPool,
}

#[derive(sqlx::FromRow)]
struct SweepRow {
    id: Uuid,
    upvotes_count: i32,
    created_at: DateTime<Utc>,
}

impl BackgroundJobsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Start all background jobs
    pub async fn start_all_jobs(&self) {
        let jobs_service = self.clone();

        // Recompute decayed post scores every 10 minutes
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(600));
            loop {
                interval.tick().await;
                if let Err(e) = jobs_service.recompute_scores().await {
                    tracing::error!("Failed to recompute post scores: {}", e);
                }
            }
        });

        let jobs_service = self.clone();

        // Drop expired sessions every hour
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                if let Err(e) = jobs_service.cleanup_expired_sessions().await {
                    tracing::error!("Failed to cleanup expired sessions: {}", e);
                }
            }
        });

        tracing::info!("Background jobs started successfully");
    }

    /// Re-rank every live post younger than the recompute window, all against
    /// the same instant so the sweep produces a consistent ordering.
    pub async fn recompute_scores(&self) -> Result<()> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::hours(ranking::RECOMPUTE_WINDOW_HOURS);

        let posts = sqlx::query_as::<_, SweepRow>(
            "SELECT id, upvotes_count, created_at FROM posts WHERE created_at >= $1 AND is_deleted = FALSE",
        )
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        let total = posts.len();
        let mut updated = 0usize;

        for post in posts {
            let score = ranking::compute_score(post.upvotes_count, post.created_at, now);

            match sqlx::query("UPDATE posts SET score = $2 WHERE id = $1")
                .bind(post.id)
                .bind(score)
                .execute(&self.db)
                .await
            {
                Ok(_) => updated += 1,
                Err(e) => {
                    tracing::warn!("Failed to update score for post {}: {}", post.id, e);
                }
            }
        }

        tracing::info!("Recomputed scores for {}/{} posts", updated, total);
        Ok(())
    }

    /// The auth extractor already rejects expired tokens; this just keeps the
    /// sessions table from growing without bound.
    pub async fn cleanup_expired_sessions(&self) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(&self.db)
            .await?;

        tracing::debug!("Expired sessions cleaned up");
        Ok(())
    }
}
