//! Dining Table Repository

use sqlx::SqlitePool;

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use super::{RepoError, RepoResult};

const DEFAULT_CAPACITY: i64 = 4;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT id, number, capacity, is_active FROM dining_table ORDER BY number",
    )
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, number, capacity, is_active FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    if data.number <= 0 {
        return Err(RepoError::Validation(format!(
            "table number must be positive, got {}",
            data.number
        )));
    }
    let capacity = data.capacity.unwrap_or(DEFAULT_CAPACITY);
    if capacity <= 0 {
        return Err(RepoError::Validation(format!(
            "capacity must be positive, got {capacity}"
        )));
    }

    let result = sqlx::query("INSERT INTO dining_table (number, capacity, is_active) VALUES (?, ?, 1)")
        .bind(data.number)
        .bind(capacity)
        .execute(pool)
        .await;

    let id = match result {
        Ok(r) => r.last_insert_rowid(),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists",
                data.number
            )));
        }
        Err(e) => return Err(e.into()),
    };

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found after insert")))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
    if let Some(number) = data.number
        && number <= 0
    {
        return Err(RepoError::Validation(format!(
            "table number must be positive, got {number}"
        )));
    }
    if let Some(capacity) = data.capacity
        && capacity <= 0
    {
        return Err(RepoError::Validation(format!(
            "capacity must be positive, got {capacity}"
        )));
    }

    let rows = sqlx::query(
        "UPDATE dining_table SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), is_active = COALESCE(?3, is_active) WHERE id = ?4",
    )
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}
