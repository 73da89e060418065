use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/verify/:token", get(handlers::verify))
        .route("/verify", post(handlers::resend_verification))
        .route("/login", post(handlers::login))
        .route("/current", get(handlers::current))
        .route("/logout", post(handlers::logout))
        .route(
            "/avatars",
            patch(handlers::upload_avatar).layer(DefaultBodyLimit::max(5 * 1024 * 1024)),
        )
        .route("/info", get(handlers::info))
        .route(
            "/",
            put(handlers::edit_profile).delete(handlers::delete_account),
        )
        .route("/daily-norma", patch(handlers::update_daily_norma))
        .route("/restore", post(handlers::restore_password))
}
