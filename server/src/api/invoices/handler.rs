//! Invoice API Handlers
//!
//! Invoice issuance orchestrates across both stores: the open cuadre
//! and payment method come from SQLite, the settlement itself commits
//! in the order engine (PAGADO + table release + invoice number), and
//! the archive rows are written afterwards - an archival failure is
//! logged, never rolled back into the sale.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{Invoice, InvoiceCreate};
use shared::order::OrderSnapshot;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{cuadre, invoice, payment_method};
use crate::orders::actions::SettleOrderAction;
use crate::utils::validation::validate_cash;
use crate::utils::{AppError, AppResult};

use super::super::orders::handler::archive_if_terminal;

const RESOURCE: &str = "invoice";

/// Create invoice response
#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
    pub order: OrderSnapshot,
    pub invoice: Invoice,
}

/// POST /api/invoice - 结算订单并签发发票
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<CreateInvoiceResponse>> {
    if let Some(cash) = payload.cash_amount {
        validate_cash(cash, "cashAmount")?;
    }
    if let Some(tip) = payload.tip_amount {
        validate_cash(tip, "tipAmount")?;
    }

    // 1. The sale must land in the open cash session
    let open_cuadre = cuadre::find_open(&state.pool)
        .await?
        .ok_or_else(|| AppError::SessionConflict("No open cash session".to_string()))?;

    // 2. Resolve the payment method and its aggregation category
    let method = payment_method::find_by_id(&state.pool, payload.payment_method_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Payment method {} not found",
                payload.payment_method_id
            ))
        })?;
    if !method.active {
        return Err(AppError::validation(format!(
            "Payment method {} is inactive",
            method.name
        )));
    }

    // 3. Settle: PAGADO, table release and invoice number in one commit
    let action = SettleOrderAction {
        order_id: payload.order_id.clone(),
        payment_method_id: method.id,
        payment_method_name: method.name.clone(),
        payment_category: method.resolved_category(),
        cash_amount: payload.cash_amount,
        tip_amount: payload.tip_amount.unwrap_or(0.0),
        customer: payload.customer_data,
        cuadre_id: open_cuadre.id,
    };
    let (order, issued) = state.orders.settle_order(action, &user.metadata())?;

    // 4. History rows (fire-and-forget relative to the committed sale)
    if let Err(e) = invoice::insert(&state.pool, &issued).await {
        tracing::error!(invoice_id = %issued.id, error = %e, "Failed to archive invoice");
    }
    archive_if_terminal(&state, &order).await;

    state.broadcast_sync(RESOURCE, "created", &issued.id, Some(&issued));
    state.broadcast_sync("order", "settled", &order.order_id, Some(&order));
    state.broadcast_sync("table", "occupancy_changed", &order.order_id, Some(&order.table_id));

    Ok(Json(CreateInvoiceResponse {
        order,
        invoice: issued,
    }))
}

/// Query params for listing invoices
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/invoice - 发票历史
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let invoices = invoice::find_all(&state.pool, query.limit, query.offset).await?;
    Ok(Json(invoices))
}

/// GET /api/invoice/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Invoice>> {
    let found = invoice::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {id} not found")))?;
    Ok(Json(found))
}
