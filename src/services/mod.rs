pub mod background_jobs;
pub mod comment_service;
pub mod post_service;
pub mod ranking;
pub mod user_service;
pub mod vote_service;
