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
    auth::{AuthUser, VerifiedUser},
    error::{AppError, Result},
    models::{CommentResponse, CreateCommentRequest, VoteKind, VoteResponse},
    services::{comment_service, vote_service},
};

pub async fn create_comment(
    State(state): State<AppState>,
    VerifiedUser(auth_user): VerifiedUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    // Validate input
    payload.validate()?;

    let comment = comment_service::create_comment(&state.db, auth_user.user_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Value>> {
    // Check if comment exists and user owns it or is an admin
    let comment = comment_service::get_comment_by_id_raw(&state.db, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != auth_user.user_id && !auth_user.is_admin {
        return Err(AppError::Authorization(
            "Cannot delete this comment".to_string(),
        ));
    }

    comment_service::delete_comment(&state.db, comment_id).await?;

    Ok(Json(json!({
        "message": "Comment deleted successfully"
    })))
}

pub async fn like_comment(
    State(state): State<AppState>,
    VerifiedUser(auth_user): VerifiedUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    let vote =
        vote_service::toggle_vote(&state.db, VoteKind::Comment, comment_id, auth_user.user_id)
            .await?;

    Ok(Json(vote))
}
