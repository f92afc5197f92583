pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        // Post routes
        .route("/api/posts", post(handlers::posts::create_post))
        .route("/api/posts/{post_id}", get(handlers::posts::get_post))
        .route("/api/posts/{post_id}", delete(handlers::posts::delete_post))
        .route(
            "/api/posts/{post_id}/upvote",
            post(handlers::posts::upvote_post),
        )
        // Comment routes
        .route("/api/comments", post(handlers::comments::create_comment))
        .route(
            "/api/comments/{comment_id}",
            delete(handlers::comments::delete_comment),
        )
        .route(
            "/api/comments/{comment_id}/like",
            post(handlers::comments::like_comment),
        )
        // User routes
        .route(
            "/api/users/{username}",
            get(handlers::users::get_user_by_username),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
