//! Payment Method Repository

use sqlx::SqlitePool;

use shared::models::{PaymentCategory, PaymentMethod};

use super::{RepoError, RepoResult};

pub async fn find_all(pool: &SqlitePool, only_active: bool) -> RepoResult<Vec<PaymentMethod>> {
    let query = if only_active {
        "SELECT id, name, active, category FROM payment_method WHERE active = 1 ORDER BY id"
    } else {
        "SELECT id, name, active, category FROM payment_method ORDER BY id"
    };
    let methods = sqlx::query_as::<_, PaymentMethod>(query).fetch_all(pool).await?;
    Ok(methods)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, active, category FROM payment_method WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(method)
}

fn validate_category(category: &Option<String>) -> RepoResult<()> {
    if let Some(c) = category
        && PaymentCategory::parse(c).is_none()
    {
        return Err(RepoError::Validation(format!(
            "category must be cash, card or transfer, got {c}"
        )));
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    category: Option<String>,
) -> RepoResult<PaymentMethod> {
    if name.trim().is_empty() {
        return Err(RepoError::Validation("name must not be empty".to_string()));
    }
    validate_category(&category)?;

    let id = sqlx::query("INSERT INTO payment_method (name, active, category) VALUES (?, 1, ?)")
        .bind(name.trim())
        .bind(category)
        .execute(pool)
        .await?
        .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment method {id} not found after insert")))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<String>,
    active: Option<bool>,
    category: Option<String>,
) -> RepoResult<PaymentMethod> {
    validate_category(&category)?;

    let rows = sqlx::query(
        "UPDATE payment_method SET name = COALESCE(?1, name), active = COALESCE(?2, active), category = COALESCE(?3, category) WHERE id = ?4",
    )
    .bind(name)
    .bind(active)
    .bind(category)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Payment method {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment method {id} not found")))
}
