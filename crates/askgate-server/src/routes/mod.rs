use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

mod ask;
mod health;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/ask", post(ask::ask))
        .layer(CorsLayer::permissive())
}
