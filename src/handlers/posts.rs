use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser, VerifiedUser},
    error::{AppError, Result},
    models::{CreatePostRequest, PostResponse, VoteKind, VoteResponse},
    services::{post_service, vote_service},
};

pub async fn create_post(
    State(state): State<AppState>,
    VerifiedUser(auth_user): VerifiedUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    // Validate input
    payload.validate()?;

    let post = post_service::create_post(&state.db, auth_user.user_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    auth_user: OptionalAuthUser,
) -> Result<Json<PostResponse>> {
    let user_id = auth_user.0.as_ref().map(|user| user.user_id);

    let post = post_service::get_post_by_id(&state.db, post_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>> {
    // Check if post exists and user owns it or is an admin
    let post = post_service::get_post_by_id_raw(&state.db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.author_id != auth_user.user_id && !auth_user.is_admin {
        return Err(AppError::Authorization(
            "Cannot delete this post".to_string(),
        ));
    }

    post_service::delete_post(&state.db, post_id).await?;

    Ok(Json(json!({
        "message": "Post deleted successfully"
    })))
}

pub async fn upvote_post(
    State(state): State<AppState>,
    VerifiedUser(auth_user): VerifiedUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    let vote =
        vote_service::toggle_vote(&state.db, VoteKind::Post, post_id, auth_user.user_id).await?;

    Ok(Json(vote))
}
