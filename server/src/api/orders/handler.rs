//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::CustomerSnapshot;
use shared::order::{CustomerChange, ItemChanges, ItemInput, OrderSnapshot, OrderStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order_archive;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "order";

/// Archive a terminal order to SQLite and drop it from the live store.
///
/// Fire-and-forget relative to the committed mutation: an archive
/// failure is logged and the snapshot stays in redb for a later retry.
pub(crate) async fn archive_if_terminal(state: &ServerState, snapshot: &OrderSnapshot) {
    if !snapshot.status.is_terminal() {
        return;
    }
    match order_archive::insert(&state.pool, snapshot).await {
        Ok(()) => {
            if let Err(e) = state.orders.purge_archived(&snapshot.order_id) {
                tracing::warn!(order_id = %snapshot.order_id, error = %e, "Failed to purge archived order");
            }
        }
        Err(e) => {
            tracing::error!(order_id = %snapshot.order_id, error = %e, "Failed to archive order");
        }
    }
}

/// Create order payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer: Option<CustomerSnapshot>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
    #[serde(default)]
    pub table_id: Option<i64>,
}

/// POST /api/order - 创建订单 (POR_APROBAR)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.open_order(
        payload.customer,
        payload.items,
        payload.table_id,
        &user.metadata(),
    )?;

    state
        .broadcast_sync(RESOURCE, "created", &order.order_id, Some(&order));
    Ok(Json(order))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include recently archived orders as well
    #[serde(default)]
    pub history: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/order - 活跃订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderSnapshot>>> {
    let mut orders = state.orders.list_active()?;
    if query.history {
        orders.extend(order_archive::find_recent(&state.pool, query.limit, query.offset).await?);
    }
    Ok(Json(orders))
}

/// GET /api/order/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    if let Some(order) = state.orders.get_order(&id)? {
        return Ok(Json(order));
    }
    let archived = order_archive::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(Json(archived))
}

/// GET /api/order/table/{table_id} - 桌台的活跃订单
pub async fn get_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Option<OrderSnapshot>>> {
    Ok(Json(state.orders.order_for_table(table_id)?))
}

/// Update status payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_status: String,
    #[serde(default)]
    pub table_id: Option<i64>,
}

/// PUT /api/order/{id} - 状态机驱动
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let status = OrderStatus::parse(&payload.order_status).ok_or_else(|| {
        AppError::validation(format!("Unknown order status: {}", payload.order_status))
    })?;

    let order = state
        .orders
        .update_status(&id, status, payload.table_id, &user.metadata())?;

    archive_if_terminal(&state, &order).await;
    state.broadcast_sync(RESOURCE, "status_changed", &id, Some(&order));
    state.broadcast_sync("table", "occupancy_changed", &id, Some(&order.table_id));
    Ok(Json(order))
}

/// POST /api/order/table/{table_id}/item - 向桌台活跃订单加菜
pub async fn add_item_to_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
    Json(payload): Json<ItemInput>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state
        .orders
        .add_item_to_table(table_id, payload, &user.metadata())?;

    state
        .broadcast_sync(RESOURCE, "item_added", &order.order_id, Some(&order));
    Ok(Json(order))
}

/// PUT /api/order/{id}/item/{item_id}
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(String, String)>,
    Json(payload): Json<ItemChanges>,
) -> AppResult<Json<OrderSnapshot>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let order = state
        .orders
        .update_item(&id, &item_id, payload, &user.metadata())?;

    state.broadcast_sync(RESOURCE, "item_updated", &id, Some(&order));
    Ok(Json(order))
}

/// DELETE /api/order/{id}/item/{item_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(String, String)>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.remove_item(&id, &item_id, &user.metadata())?;

    state.broadcast_sync(RESOURCE, "item_removed", &id, Some(&order));
    Ok(Json(order))
}

/// Move item payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemRequest {
    pub mesa_id: i64,
}

/// Move item response: both touched orders
#[derive(Debug, Serialize)]
pub struct MoveItemResponse {
    pub source: OrderSnapshot,
    pub destination: OrderSnapshot,
}

/// POST /api/order/{id}/item/{item_id}/move - 移菜到另一桌
pub async fn move_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(String, String)>,
    Json(payload): Json<MoveItemRequest>,
) -> AppResult<Json<MoveItemResponse>> {
    let outcome = state
        .orders
        .move_item(&id, &item_id, payload.mesa_id, &user.metadata())?;

    state.broadcast_sync(RESOURCE, "item_moved", &id, Some(&outcome.source));
    state.broadcast_sync(
        RESOURCE,
        "item_moved",
        &outcome.destination.order_id,
        Some(&outcome.destination),
    );

    Ok(Json(MoveItemResponse {
        source: outcome.source,
        destination: outcome.destination,
    }))
}

/// PUT /api/order/{id}/customer
pub async fn set_customer(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CustomerChange>,
) -> AppResult<Json<OrderSnapshot>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_NAME_LEN)?;
    validate_optional_text(&payload.document, "document", MAX_NAME_LEN)?;

    let order = state.orders.set_customer(&id, payload, &user.metadata())?;

    state.broadcast_sync(RESOURCE, "customer_changed", &id, Some(&order));
    Ok(Json(order))
}

/// Mark printed payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPrintedRequest {
    pub item_ids: Vec<String>,
}

/// POST /api/order/{id}/printed - 厨房票打印记账
pub async fn mark_printed(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MarkPrintedRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state
        .orders
        .mark_printed(&id, payload.item_ids, &user.metadata())?;

    state.broadcast_sync(RESOURCE, "printed", &id, Some(&order));
    Ok(Json(order))
}
