//! Dining Table Model (mesa)

use serde::{Deserialize, Serialize};

/// Dining table entity - the physical catalog row.
///
/// Occupancy is not stored here: it is derived from the live-order
/// table index and surfaced through [`TableView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub number: i64,
    pub capacity: i64,
    pub is_active: bool,
}

/// Occupancy status as shown to terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    /// Free - can be assigned to a new order
    Available,
    /// Held by a confirmed live order (PENDIENTE and onward)
    Booked,
    /// Held by an order still awaiting staff confirmation
    PendingApproval,
}

/// Dining table plus derived occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: i64,
    pub number: i64,
    pub capacity: i64,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_order_id: Option<String>,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: i64,
    pub capacity: Option<i64>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<i64>,
    pub capacity: Option<i64>,
    pub is_active: Option<bool>,
}
