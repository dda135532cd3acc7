//! Discount API Handlers
//!
//! Terminals build their discounted product variants from this list.
//! Records violating the percent-XOR-value rule are skipped and logged
//! rather than poisoning the whole listing.

use axum::{Json, extract::State};

use shared::models::Discount;

use crate::core::ServerState;
use crate::db::repository::discount;
use crate::pricing::discount_from_record;
use crate::utils::AppResult;

/// GET /api/discount - 有效折扣列表
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Discount>>> {
    let discounts = discount::find_active(&state.pool)
        .await?
        .into_iter()
        .filter(|d| match discount_from_record(d) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(discount_id = d.id, error = %e, "Skipping malformed discount");
                false
            }
        })
        .collect();
    Ok(Json(discounts))
}
