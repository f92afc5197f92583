use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub slug: Option<String>,
    pub author_id: Uuid,
    pub upvotes_count: i32,
    pub score: f64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Create post request
#[derive(Debug, Validate, Deserialize)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(url)]
    pub url: String,
}

// Post response with author and the viewer's vote state
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub slug: Option<String>,
    pub upvotes_count: i32,
    pub score: f64,
    pub has_upvoted: bool,
    pub author: PostAuthor,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub username: String,
}
