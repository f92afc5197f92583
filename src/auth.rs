use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::Session,
    services::user_service,
};

#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email_verified: bool,
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = $1")
            .bind(bearer.token())
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid session token".to_string()))?;

        if session.expires_at < Utc::now() {
            return Err(AppError::Authentication("Session expired".to_string()));
        }

        // Always load a fresh user row so ban and verification flags take
        // effect immediately, not at next login.
        let user = user_service::get_user_by_id(&state.db, session.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid session token".to_string()))?;

        if user.is_banned {
            return Err(AppError::PreconditionFailed(
                "Your account has been banned".to_string(),
            ));
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email_verified: user.email_verified,
            is_admin: user.is_admin,
        })
    }
}

// For endpoints that create content: requires a verified email address
#[derive(Debug)]
pub struct VerifiedUser(pub AuthUser);

impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.email_verified {
            return Err(AppError::PreconditionFailed(
                "Please verify your email address first".to_string(),
            ));
        }

        Ok(VerifiedUser(auth_user))
    }
}

// Optional auth user (for endpoints that work with or without auth)
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}
