//! Cash Desk API 模块 (cuadre)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cash-desk", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/current", get(handler::current))
        .route("/open", post(handler::open))
        .route("/close", post(handler::close))
        .route("/movements", get(handler::movements))
        .route("/export", get(handler::export))
        .route("/history", get(handler::history))
}
