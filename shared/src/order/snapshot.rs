//! Order snapshot - the live order state
//!
//! The snapshot carries a `version` counter bumped on every committed
//! mutation so terminals can detect stale reads after reconnecting.

use serde::{Deserialize, Serialize};

use super::types::{DiscountSnapshot, OrderStatus};
use crate::models::{CustomerSnapshot, Invoice};

/// One line of the order's item ledger.
///
/// `unit_price` is a frozen snapshot computed by the pricing engine at
/// insertion time - it is never recomputed from the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemSnapshot {
    /// Item instance id (uuid)
    pub id: String,
    pub product_id: i64,
    /// Base product when added through a discount variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_product_id: Option<i64>,
    /// Product name frozen at insertion
    pub name: String,
    /// Integer quantity ≥ 1 (0 means the line is removed)
    pub quantity: i64,
    /// Discounted gross unit price, rounded to whole pesos once
    pub unit_price: f64,
    /// Pre-discount gross unit price
    pub original_price: f64,
    /// unit_price × quantity
    pub line_total: f64,
    /// Tax percentage frozen from the catalog
    pub tax_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Quantity already sent to the kitchen
    #[serde(default)]
    pub printed_qty: i64,
}

impl OrderItemSnapshot {
    /// Quantity still waiting for a kitchen ticket
    pub fn pending_print(&self) -> i64 {
        (self.quantity - self.printed_qty).max(0)
    }
}

/// Derived order totals. `total` is always `subtotal + tax`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBills {
    /// Tax-exclusive amount
    pub subtotal: f64,
    pub tax: f64,
    /// Tax-inclusive amount owed
    pub total: f64,
}

/// One line of a kitchen print run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRunLine {
    pub item_id: String,
    pub quantity: i64,
}

/// A kitchen ticket emission, identified by a per-order monotonic run
/// number for auditability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRun {
    pub run: u64,
    pub lines: Vec<PrintRunLine>,
    pub operator_name: String,
    pub printed_at: i64,
}

/// Live order snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub order_id: String,
    /// Bumped on every committed mutation
    pub version: u64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    pub items: Vec<OrderItemSnapshot>,
    pub bills: OrderBills,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub print_runs: Vec<PrintRun>,
    /// Set once by successful invoice issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    pub cashier_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderSnapshot {
    pub fn new(order_id: String, cashier_name: String, now: i64) -> Self {
        Self {
            order_id,
            version: 0,
            status: OrderStatus::PorAprobar,
            customer: None,
            table_id: None,
            items: Vec::new(),
            bills: OrderBills::default(),
            print_runs: Vec::new(),
            invoice: None,
            cashier_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn find_item(&self, item_id: &str) -> Option<&OrderItemSnapshot> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut OrderItemSnapshot> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Total quantity still waiting for a kitchen ticket
    pub fn pending_print_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.pending_print()).sum()
    }

    /// Next kitchen print-run number (1-based, monotonic per order)
    pub fn next_print_run(&self) -> u64 {
        self.print_runs.last().map(|r| r.run + 1).unwrap_or(1)
    }
}
