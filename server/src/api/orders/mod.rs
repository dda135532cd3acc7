//! Order API Module
//!
//! All mutations go through the OrdersManager; reads fall back to the
//! SQLite archive for settled/closed orders.

pub(crate) mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/order", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id).put(handler::update_status))
        .route("/table/{table_id}", get(handler::get_by_table))
        .route("/table/{table_id}/item", post(handler::add_item_to_table))
        .route(
            "/{id}/item/{item_id}",
            put(handler::update_item).delete(handler::remove_item),
        )
        .route("/{id}/item/{item_id}/move", post(handler::move_item))
        .route("/{id}/customer", put(handler::set_customer))
        .route("/{id}/printed", post(handler::mark_printed))
}
