//! Cuadre Repository - cash-desk session lifecycle and reconciliation
//!
//! The single-open invariant is enforced twice: a pre-insert check for
//! a friendly error, and a partial unique index on `estado = 'ABIERTO'`
//! so a check-then-write race still cannot produce two open sessions.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use shared::models::{Cuadre, CuadreClose, CuadreOpen, CuadreTotals, PaymentCategory};
use shared::util::now_millis;

use super::{RepoError, RepoResult, invoice};
use crate::orders::money::{to_decimal, to_f64};

const COLUMNS: &str = "id, opening_user, opened_at, saldo_inicial, closing_user, closed_at, estado, saldo_real, gastos, diferencia, observaciones";

fn validate_cash_amount(amount: f64, field: &str) -> RepoResult<()> {
    if !amount.is_finite() {
        return Err(RepoError::Validation(format!(
            "{field} must be a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(RepoError::Validation(format!(
            "{field} cannot be negative: {amount}"
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Cuadre>> {
    let cuadre =
        sqlx::query_as::<_, Cuadre>(&format!("SELECT {COLUMNS} FROM cuadre WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(cuadre)
}

/// The currently ABIERTO cuadre, if any
pub async fn find_open(pool: &SqlitePool) -> RepoResult<Option<Cuadre>> {
    let cuadre = sqlx::query_as::<_, Cuadre>(&format!(
        "SELECT {COLUMNS} FROM cuadre WHERE estado = 'ABIERTO' LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(cuadre)
}

pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Cuadre>> {
    let cuadres = sqlx::query_as::<_, Cuadre>(&format!(
        "SELECT {COLUMNS} FROM cuadre ORDER BY opened_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(cuadres)
}

/// Open a new session. Fails with SessionConflict while one is ABIERTO.
pub async fn open(pool: &SqlitePool, data: CuadreOpen, opening_user: &str) -> RepoResult<Cuadre> {
    validate_cash_amount(data.saldo_inicial, "saldoInicial")?;

    if find_open(pool).await?.is_some() {
        return Err(RepoError::SessionConflict(
            "A cash session is already open".to_string(),
        ));
    }

    let now = now_millis();
    let result = sqlx::query(
        "INSERT INTO cuadre (opening_user, opened_at, saldo_inicial, estado, gastos) VALUES (?, ?, ?, 'ABIERTO', 0)",
    )
    .bind(opening_user)
    .bind(now)
    .bind(data.saldo_inicial)
    .execute(pool)
    .await;

    let id = match result {
        Ok(r) => r.last_insert_rowid(),
        // the partial unique index wins the race the pre-check lost
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(RepoError::SessionConflict(
                "A cash session is already open".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cuadre {id} not found after insert")))
}

/// Totals by payment category for a cuadre, derived from its invoices.
///
/// `gastos` only affects total_caja once the session is closed (the
/// closing payload carries it); for an open session it is still 0.
pub async fn totals(pool: &SqlitePool, cuadre: &Cuadre) -> RepoResult<CuadreTotals> {
    let invoices = invoice::find_by_cuadre(pool, cuadre.id).await?;

    let mut cash = Decimal::ZERO;
    let mut card = Decimal::ZERO;
    let mut transfer = Decimal::ZERO;

    for inv in &invoices {
        let amount = to_decimal(inv.totals.total);
        match PaymentCategory::parse(&inv.payment_category) {
            Some(PaymentCategory::Cash) => cash += amount,
            Some(PaymentCategory::Card) => card += amount,
            Some(PaymentCategory::Transfer) | None => transfer += amount,
        }
    }

    let total_caja = to_decimal(cuadre.saldo_inicial) + cash - to_decimal(cuadre.gastos);

    Ok(CuadreTotals {
        cash: to_f64(cash),
        card: to_f64(card),
        transfer: to_f64(transfer),
        total_caja: to_f64(total_caja),
    })
}

/// Close the ABIERTO cuadre with the counted drawer amount.
///
/// diferencia = saldo_real − (saldo_inicial + cash − gastos), computed
/// in the UPDATE itself so the close is a single atomic write; closing
/// is terminal.
pub async fn close(
    pool: &SqlitePool,
    id: i64,
    data: CuadreClose,
    closing_user: &str,
) -> RepoResult<Cuadre> {
    validate_cash_amount(data.saldo_real, "saldoReal")?;
    validate_cash_amount(data.gastos, "gastos")?;

    let cuadre = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cuadre {id} not found")))?;
    let session_totals = totals(pool, &cuadre).await?;

    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE cuadre SET estado = 'CERRADO', closed_at = ?1, closing_user = ?2, saldo_real = ?3, gastos = ?4, diferencia = ?3 - (saldo_inicial + ?5 - ?4), observaciones = COALESCE(?6, observaciones) WHERE id = ?7 AND estado = 'ABIERTO'",
    )
    .bind(now)
    .bind(closing_user)
    .bind(data.saldo_real)
    .bind(data.gastos)
    .bind(session_totals.cash)
    .bind(data.observaciones)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::SessionConflict(format!(
            "Cuadre {id} is not open"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cuadre {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{CuadreEstado, Invoice, InvoiceTotals};
    use shared::util::new_id;

    fn invoice_for(cuadre_id: i64, number: i64, category: &str, total: f64) -> Invoice {
        Invoice {
            id: new_id(),
            order_id: new_id(),
            invoice_number: number,
            payment_method_id: 1,
            payment_method_name: category.to_string(),
            payment_category: category.to_string(),
            totals: InvoiceTotals {
                subtotal: total,
                tax: 0.0,
                tip: 0.0,
                total,
            },
            cash_amount: None,
            change: 0.0,
            customer: None,
            cuadre_id,
            created_at: now_millis(),
        }
    }

    #[tokio::test]
    async fn test_open_rejects_second_session() {
        let db = DbService::new_in_memory().await.unwrap();
        let cuadre = open(&db.pool, CuadreOpen { saldo_inicial: 50000.0 }, "Ana")
            .await
            .unwrap();
        assert_eq!(cuadre.estado, CuadreEstado::Abierto);
        assert_eq!(cuadre.saldo_inicial, 50000.0);

        let err = open(&db.pool, CuadreOpen { saldo_inicial: 0.0 }, "Luis")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::SessionConflict(_)));
    }

    #[tokio::test]
    async fn test_open_validates_saldo() {
        let db = DbService::new_in_memory().await.unwrap();
        let err = open(&db.pool, CuadreOpen { saldo_inicial: -1.0 }, "Ana")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_close_balanced_drawer() {
        let db = DbService::new_in_memory().await.unwrap();
        let cuadre = open(&db.pool, CuadreOpen { saldo_inicial: 50000.0 }, "Ana")
            .await
            .unwrap();

        // 120000 in cash, 30000 by card, 15000 by transfer
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 1, "cash", 70000.0))
            .await
            .unwrap();
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 2, "cash", 50000.0))
            .await
            .unwrap();
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 3, "card", 30000.0))
            .await
            .unwrap();
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 4, "transfer", 15000.0))
            .await
            .unwrap();

        let t = totals(&db.pool, &cuadre).await.unwrap();
        assert_eq!(t.cash, 120000.0);
        assert_eq!(t.card, 30000.0);
        assert_eq!(t.transfer, 15000.0);
        assert_eq!(t.total_caja, 170000.0);

        // saldoReal 150000 = 50000 + 120000 - 20000 → diferencia 0
        let closed = close(
            &db.pool,
            cuadre.id,
            CuadreClose {
                saldo_real: 150000.0,
                gastos: 20000.0,
                observaciones: Some("sin novedad".to_string()),
            },
            "Ana",
        )
        .await
        .unwrap();

        assert_eq!(closed.estado, CuadreEstado::Cerrado);
        assert_eq!(closed.diferencia, Some(0.0));
        assert_eq!(closed.gastos, 20000.0);
        assert!(closed.closed_at.is_some());
        assert_eq!(closed.closing_user.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_close_short_drawer_is_negative() {
        let db = DbService::new_in_memory().await.unwrap();
        let cuadre = open(&db.pool, CuadreOpen { saldo_inicial: 50000.0 }, "Ana")
            .await
            .unwrap();
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 1, "cash", 120000.0))
            .await
            .unwrap();

        let closed = close(
            &db.pool,
            cuadre.id,
            CuadreClose {
                saldo_real: 145000.0,
                gastos: 20000.0,
                observaciones: None,
            },
            "Ana",
        )
        .await
        .unwrap();

        assert_eq!(closed.diferencia, Some(-5000.0));
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let db = DbService::new_in_memory().await.unwrap();
        let cuadre = open(&db.pool, CuadreOpen { saldo_inicial: 0.0 }, "Ana")
            .await
            .unwrap();
        close(
            &db.pool,
            cuadre.id,
            CuadreClose {
                saldo_real: 0.0,
                gastos: 0.0,
                observaciones: None,
            },
            "Ana",
        )
        .await
        .unwrap();

        // Closing again fails
        let err = close(
            &db.pool,
            cuadre.id,
            CuadreClose {
                saldo_real: 0.0,
                gastos: 0.0,
                observaciones: None,
            },
            "Ana",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::SessionConflict(_)));

        // And a new session can be opened
        assert!(find_open(&db.pool).await.unwrap().is_none());
        open(&db.pool, CuadreOpen { saldo_inicial: 10000.0 }, "Luis")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_category_counts_as_transfer() {
        let db = DbService::new_in_memory().await.unwrap();
        let cuadre = open(&db.pool, CuadreOpen { saldo_inicial: 0.0 }, "Ana")
            .await
            .unwrap();
        invoice::insert(&db.pool, &invoice_for(cuadre.id, 1, "cheque", 9000.0))
            .await
            .unwrap();

        let t = totals(&db.pool, &cuadre).await.unwrap();
        assert_eq!(t.transfer, 9000.0);
        assert_eq!(t.cash, 0.0);
    }
}
