//! Cash Desk API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use shared::models::{Cuadre, CuadreClose, CuadreOpen, CuadreTotals, Invoice};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{cuadre, invoice};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "cuadre";

/// Current session view: cuadre + its movements + derived totals
#[derive(Debug, Serialize)]
pub struct CashDeskView {
    pub cuadre: Option<Cuadre>,
    pub movements: Vec<Invoice>,
    pub totals: Option<CuadreTotals>,
}

/// GET /api/cash-desk/current
pub async fn current(State(state): State<ServerState>) -> AppResult<Json<CashDeskView>> {
    let Some(open_cuadre) = cuadre::find_open(&state.pool).await? else {
        return Ok(Json(CashDeskView {
            cuadre: None,
            movements: Vec::new(),
            totals: None,
        }));
    };

    let movements = invoice::find_by_cuadre(&state.pool, open_cuadre.id).await?;
    let totals = cuadre::totals(&state.pool, &open_cuadre).await?;

    Ok(Json(CashDeskView {
        cuadre: Some(open_cuadre),
        movements,
        totals: Some(totals),
    }))
}

/// POST /api/cash-desk/open - 开场次
pub async fn open(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CuadreOpen>,
) -> AppResult<Json<Cuadre>> {
    if !user.role.can_change_status() {
        return Err(AppError::forbidden(
            "Only admin or cashier can open the cash desk",
        ));
    }

    let opened = cuadre::open(&state.pool, payload, &user.name).await?;

    let id = opened.id.to_string();
    state.broadcast_sync(RESOURCE, "opened", &id, Some(&opened));
    Ok(Json(opened))
}

/// POST /api/cash-desk/close - 收场次
pub async fn close(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CuadreClose>,
) -> AppResult<Json<Cuadre>> {
    if !user.role.can_change_status() {
        return Err(AppError::forbidden(
            "Only admin or cashier can close the cash desk",
        ));
    }

    let open_cuadre = cuadre::find_open(&state.pool)
        .await?
        .ok_or_else(|| AppError::SessionConflict("No open cash session".to_string()))?;

    let closed = cuadre::close(&state.pool, open_cuadre.id, payload, &user.name).await?;

    let id = closed.id.to_string();
    state.broadcast_sync(RESOURCE, "closed", &id, Some(&closed));
    Ok(Json(closed))
}

/// Query params addressing one cuadre
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuadreQuery {
    pub cuadre_id: i64,
}

/// GET /api/cash-desk/movements?cuadreId=N
pub async fn movements(
    State(state): State<ServerState>,
    Query(query): Query<CuadreQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let movements = invoice::find_by_cuadre(&state.pool, query.cuadre_id).await?;
    Ok(Json(movements))
}

/// Query params for history listing
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/cash-desk/history - 历史场次
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<Cuadre>>> {
    let cuadres = cuadre::find_all(&state.pool, query.limit, query.offset).await?;
    Ok(Json(cuadres))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Epoch millis rendered in the business timezone
fn local_datetime(tz: chrono_tz::Tz, millis: i64) -> String {
    use chrono::TimeZone;
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// GET /api/cash-desk/export?cuadreId=N - 场次流水 CSV
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<CuadreQuery>,
) -> AppResult<impl IntoResponse> {
    let target = cuadre::find_by_id(&state.pool, query.cuadre_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cuadre {} not found", query.cuadre_id)))?;
    let movements = invoice::find_by_cuadre(&state.pool, target.id).await?;

    let tz = state.config.timezone;
    let mut csv = String::from(
        "invoice_number,fecha,order_id,payment_method,category,subtotal,tax,tip,total,change\n",
    );
    for m in &movements {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            m.invoice_number,
            local_datetime(tz, m.created_at),
            csv_field(&m.order_id),
            csv_field(&m.payment_method_name),
            m.payment_category,
            m.totals.subtotal,
            m.totals.tax,
            m.totals.tip,
            m.totals.total,
            m.change,
        ));
    }

    let filename = format!("movimientos-caja-{}.csv", target.id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
