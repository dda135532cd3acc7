//! Discount Model (read-only catalog input)

use serde::{Deserialize, Serialize};

/// Discount catalog record.
///
/// A valid record defines `percent` XOR `value`; both present (or
/// neither) is rejected before any price calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub active: bool,
    /// Target product ids
    #[serde(default)]
    pub product_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
