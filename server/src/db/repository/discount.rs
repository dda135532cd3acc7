//! Discount Repository (read-only catalog input)

use sqlx::SqlitePool;

use shared::models::Discount;

use super::RepoResult;

/// Raw row; product_ids is a JSON array column
#[derive(sqlx::FromRow)]
struct DiscountRow {
    id: i64,
    name: String,
    percent: Option<f64>,
    value: Option<f64>,
    active: bool,
    product_ids: String,
    message: Option<String>,
}

impl DiscountRow {
    fn into_model(self) -> RepoResult<Discount> {
        let product_ids: Vec<i64> = serde_json::from_str(&self.product_ids)?;
        Ok(Discount {
            id: self.id,
            name: self.name,
            percent: self.percent,
            value: self.value,
            active: self.active,
            product_ids,
            message: self.message,
        })
    }
}

pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Discount>> {
    let rows = sqlx::query_as::<_, DiscountRow>(
        "SELECT id, name, percent, value, active, product_ids, message FROM discount WHERE active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(DiscountRow::into_model).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Discount>> {
    let row = sqlx::query_as::<_, DiscountRow>(
        "SELECT id, name, percent, value, active, product_ids, message FROM discount WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(DiscountRow::into_model).transpose()
}
