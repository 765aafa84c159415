use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod webhook;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(health::health_check))
        .route("/webhook", axum::routing::post(webhook::receive_update))
}
