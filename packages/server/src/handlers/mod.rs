use axum::extract::DefaultBodyLimit;

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod inquiry;
pub mod post;
pub mod product;
pub mod project;
pub mod service;
pub mod settings;
pub mod user;

/// Body limit for multipart mutation routes. Two 10 MiB images plus fields
/// fit comfortably.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024) // 32 MB
}
