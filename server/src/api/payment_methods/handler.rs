//! Payment Method API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::models::PaymentMethod;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payment_method;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "payment_method";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include inactive methods (admin screens)
    #[serde(default)]
    pub all: bool,
}

/// GET /api/paymethod
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PaymentMethod>>> {
    let methods = payment_method::find_all(&state.pool, !query.all).await?;
    Ok(Json(methods))
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// POST /api/paymethod (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateRequest>,
) -> AppResult<Json<PaymentMethod>> {
    if !user.role.is_admin() {
        return Err(AppError::forbidden("Only an admin can manage payment methods"));
    }
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let method = payment_method::create(&state.pool, &payload.name, payload.category).await?;

    let id = method.id.to_string();
    state.broadcast_sync(RESOURCE, "created", &id, Some(&method));
    Ok(Json(method))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
}

/// PUT /api/paymethod/{id} (admin)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRequest>,
) -> AppResult<Json<PaymentMethod>> {
    if !user.role.is_admin() {
        return Err(AppError::forbidden("Only an admin can manage payment methods"));
    }
    let method = payment_method::update(
        &state.pool,
        id,
        payload.name,
        payload.active,
        payload.category,
    )
    .await?;

    let id_str = id.to_string();
    state.broadcast_sync(RESOURCE, "updated", &id_str, Some(&method));
    Ok(Json(method))
}
