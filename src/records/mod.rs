use axum::{routing::get, Router};

use crate::state::AppState;

pub mod aggregate;
pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_all).post(handlers::add))
        .route("/today", get(handlers::get_today))
        .route(
            "/:id",
            get(handlers::get_by_id)
                .put(handlers::update_by_id)
                .delete(handlers::delete_by_id),
        )
}
