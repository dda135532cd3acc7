//! Order Archive Repository
//!
//! Settled and closed orders leave the live redb store and land here as
//! append-only history. The full snapshot is kept as JSON next to the
//! flat columns used for listing.

use sqlx::SqlitePool;

use shared::order::OrderSnapshot;
use shared::util::now_millis;

use super::RepoResult;

#[derive(sqlx::FromRow)]
struct ArchiveRow {
    snapshot: String,
}

pub async fn insert(pool: &SqlitePool, snapshot: &OrderSnapshot) -> RepoResult<()> {
    let json = serde_json::to_string(snapshot)?;
    sqlx::query(
        "INSERT OR REPLACE INTO order_archive (order_id, status, table_id, cashier_name, subtotal, tax, total, invoice_number, snapshot, created_at, closed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&snapshot.order_id)
    .bind(snapshot.status.as_str())
    .bind(snapshot.table_id)
    .bind(&snapshot.cashier_name)
    .bind(snapshot.bills.subtotal)
    .bind(snapshot.bills.tax)
    .bind(snapshot.bills.total)
    .bind(snapshot.invoice.as_ref().map(|i| i.invoice_number))
    .bind(json)
    .bind(snapshot.created_at)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<OrderSnapshot>> {
    let row = sqlx::query_as::<_, ArchiveRow>(
        "SELECT snapshot FROM order_archive WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(r) => Ok(Some(serde_json::from_str(&r.snapshot)?)),
        None => Ok(None),
    }
}

pub async fn find_recent(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<OrderSnapshot>> {
    let rows = sqlx::query_as::<_, ArchiveRow>(
        "SELECT snapshot FROM order_archive ORDER BY closed_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|r| Ok(serde_json::from_str(&r.snapshot)?))
        .collect()
}
