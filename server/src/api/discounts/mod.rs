//! Discount API 模块 (read-only catalog input)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/discount", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list_active))
}
