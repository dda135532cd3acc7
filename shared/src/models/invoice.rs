//! Invoice Model

use serde::{Deserialize, Serialize};

use super::customer::CustomerSnapshot;

/// Invoice totals breakdown.
///
/// `total` is the amount owed: subtotal + tax + tip. The tip is added
/// after tax and is itself untaxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

/// Issued invoice - immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    /// Strictly increasing across the installation
    pub invoice_number: i64,
    pub payment_method_id: i64,
    pub payment_method_name: String,
    /// Resolved category at issuance time ("cash" | "card" | "transfer")
    pub payment_category: String,
    pub totals: InvoiceTotals,
    /// Tendered cash (cash payments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_amount: Option<f64>,
    /// Change returned (cash payments only, 0 otherwise)
    pub change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSnapshot>,
    pub cuadre_id: i64,
    pub created_at: i64,
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreate {
    pub order_id: String,
    pub payment_method_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_data: Option<CustomerSnapshot>,
}
