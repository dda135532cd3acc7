//! Order lifecycle and input types

use serde::{Deserialize, Serialize};

use crate::models::CustomerSnapshot;

/// Order lifecycle status.
///
/// ```text
/// POR_APROBAR → PENDIENTE ↔ LISTO → ENTREGADO → { PAGADO | CERRADO }
/// ```
///
/// PAGADO is reached only through invoice issuance; CERRADO is the
/// administrative close. Both are terminal: the order becomes immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "POR_APROBAR")]
    PorAprobar,
    #[serde(rename = "PENDIENTE")]
    Pendiente,
    #[serde(rename = "LISTO")]
    Listo,
    #[serde(rename = "ENTREGADO")]
    Entregado,
    #[serde(rename = "PAGADO")]
    Pagado,
    #[serde(rename = "CERRADO")]
    Cerrado,
}

impl OrderStatus {
    /// Terminal statuses lock the order against any further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Pagado | Self::Cerrado)
    }

    /// Statuses that hold a table as Booked (vs PendingApproval)
    pub fn books_table(&self) -> bool {
        matches!(self, Self::Pendiente | Self::Listo | Self::Entregado)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PorAprobar => "POR_APROBAR",
            Self::Pendiente => "PENDIENTE",
            Self::Listo => "LISTO",
            Self::Entregado => "ENTREGADO",
            Self::Pagado => "PAGADO",
            Self::Cerrado => "CERRADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POR_APROBAR" => Some(Self::PorAprobar),
            "PENDIENTE" => Some(Self::Pendiente),
            "LISTO" => Some(Self::Listo),
            "ENTREGADO" => Some(Self::Entregado),
            "PAGADO" => Some(Self::Pagado),
            "CERRADO" => Some(Self::Cerrado),
            _ => None,
        }
    }
}

/// Staff role, as asserted by the out-of-scope auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Admin,
    Cashier,
    Waiter,
}

impl StaffRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "cashier" | "cajero" => Some(Self::Cashier),
            "waiter" | "mesero" => Some(Self::Waiter),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles allowed to drive the order state machine
    pub fn can_change_status(&self) -> bool {
        matches!(self, Self::Admin | Self::Cashier)
    }
}

/// Discount kind - a discount defines percent XOR value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    #[serde(rename = "PERCENT")]
    Percent,
    #[serde(rename = "VALUE")]
    Value,
}

/// Discount applied to an item, frozen at pricing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSnapshot {
    /// Source discount record, when the discount came from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Item addition input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub product_id: i64,
    /// Base product when the line was added through a discount variant
    #[serde(default)]
    pub base_product_id: Option<i64>,
    pub name: String,
    /// Catalog gross unit price (tax-inclusive)
    pub price: f64,
    /// Pre-discount gross price; defaults to `price`
    #[serde(default)]
    pub original_price: Option<f64>,
    /// Tax percentage frozen from the catalog
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub discount: Option<DiscountSnapshot>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

/// Item update input - quantity ≤ 0 behaves as removal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Customer assignment - snapshot, registered-user link, or clear
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerChange {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub clear: bool,
}

impl CustomerChange {
    /// Resolve into the snapshot to store; `None` clears the customer
    pub fn into_snapshot(self) -> Option<CustomerSnapshot> {
        if self.clear {
            return None;
        }
        let snapshot = CustomerSnapshot {
            name: self.name,
            phone: self.phone,
            document: self.document,
            user_id: self.user_id,
        };
        if snapshot.is_empty() { None } else { Some(snapshot) }
    }
}
