//! Dining Table API Handlers
//!
//! The list endpoint joins the SQLite catalog with the live occupancy
//! index: a table held by a confirmed order shows Booked, one still
//! awaiting approval shows PendingApproval, anything else is Available.

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{DiningTableCreate, DiningTableUpdate, TableStatus, TableView};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "table";

/// GET /api/table - 桌台列表与占用状态
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<TableView>>> {
    let tables = dining_table::find_all(&state.pool).await?;
    let occupancy = state.orders.table_occupancy()?;

    let views = tables
        .into_iter()
        .filter(|t| t.is_active)
        .map(|t| {
            let occupant = occupancy.get(&t.id);
            let status = match occupant {
                None => TableStatus::Available,
                Some(o) if o.status.books_table() => TableStatus::Booked,
                Some(_) => TableStatus::PendingApproval,
            };
            TableView {
                id: t.id,
                number: t.number,
                capacity: t.capacity,
                status,
                current_order_id: occupant.map(|o| o.order_id.clone()),
            }
        })
        .collect();

    Ok(Json(views))
}

/// POST /api/table - 新建桌台 (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<shared::models::DiningTable>> {
    if !user.role.is_admin() {
        return Err(AppError::forbidden("Only an admin can manage tables"));
    }
    let table = dining_table::create(&state.pool, payload).await?;

    let id = table.id.to_string();
    state.broadcast_sync(RESOURCE, "created", &id, Some(&table));
    Ok(Json(table))
}

/// PUT /api/table/{id} - 更新桌台 (admin)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<shared::models::DiningTable>> {
    if !user.role.is_admin() {
        return Err(AppError::forbidden("Only an admin can manage tables"));
    }
    let table = dining_table::update(&state.pool, id, payload).await?;

    let id_str = id.to_string();
    state.broadcast_sync(RESOURCE, "updated", &id_str, Some(&table));
    Ok(Json(table))
}
