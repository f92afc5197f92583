use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::UserProfileResponse,
    services::user_service,
};

pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfileResponse>> {
    let user = user_service::get_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfileResponse::from(user)))
}
