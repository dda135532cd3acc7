//! Invoice Repository (append-only history)

use sqlx::SqlitePool;

use shared::models::{CustomerSnapshot, Invoice, InvoiceTotals};

use super::RepoResult;

/// Raw row; customer is flattened into nullable columns
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    order_id: String,
    invoice_number: i64,
    payment_method_id: i64,
    payment_method_name: String,
    payment_category: String,
    subtotal: f64,
    tax: f64,
    tip: f64,
    total: f64,
    cash_amount: Option<f64>,
    change: f64,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    customer_document: Option<String>,
    customer_user_id: Option<i64>,
    cuadre_id: i64,
    created_at: i64,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        let customer = CustomerSnapshot {
            name: row.customer_name,
            phone: row.customer_phone,
            document: row.customer_document,
            user_id: row.customer_user_id,
        };
        Invoice {
            id: row.id,
            order_id: row.order_id,
            invoice_number: row.invoice_number,
            payment_method_id: row.payment_method_id,
            payment_method_name: row.payment_method_name,
            payment_category: row.payment_category,
            totals: InvoiceTotals {
                subtotal: row.subtotal,
                tax: row.tax,
                tip: row.tip,
                total: row.total,
            },
            cash_amount: row.cash_amount,
            change: row.change,
            customer: (!customer.is_empty()).then_some(customer),
            cuadre_id: row.cuadre_id,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, order_id, invoice_number, payment_method_id, payment_method_name, payment_category, subtotal, tax, tip, total, cash_amount, change, customer_name, customer_phone, customer_document, customer_user_id, cuadre_id, created_at";

pub async fn insert(pool: &SqlitePool, invoice: &Invoice) -> RepoResult<()> {
    let customer = invoice.customer.clone().unwrap_or_default();
    sqlx::query(
        "INSERT INTO invoice (id, order_id, invoice_number, payment_method_id, payment_method_name, payment_category, subtotal, tax, tip, total, cash_amount, change, customer_name, customer_phone, customer_document, customer_user_id, cuadre_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&invoice.id)
    .bind(&invoice.order_id)
    .bind(invoice.invoice_number)
    .bind(invoice.payment_method_id)
    .bind(&invoice.payment_method_name)
    .bind(&invoice.payment_category)
    .bind(invoice.totals.subtotal)
    .bind(invoice.totals.tax)
    .bind(invoice.totals.tip)
    .bind(invoice.totals.total)
    .bind(invoice.cash_amount)
    .bind(invoice.change)
    .bind(customer.name)
    .bind(customer.phone)
    .bind(customer.document)
    .bind(customer.user_id)
    .bind(invoice.cuadre_id)
    .bind(invoice.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Invoice>> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {COLUMNS} FROM invoice WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Invoice::from))
}

pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Invoice>> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {COLUMNS} FROM invoice ORDER BY invoice_number DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Invoice::from).collect())
}

/// Movements of a cuadre, oldest first
pub async fn find_by_cuadre(pool: &SqlitePool, cuadre_id: i64) -> RepoResult<Vec<Invoice>> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {COLUMNS} FROM invoice WHERE cuadre_id = ? ORDER BY invoice_number"
    ))
    .bind(cuadre_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Invoice::from).collect())
}
