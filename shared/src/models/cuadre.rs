//! Cuadre Model (cash-desk reconciliation session)

use serde::{Deserialize, Serialize};

/// Cuadre status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum CuadreEstado {
    #[serde(rename = "ABIERTO")]
    Abierto,
    #[serde(rename = "CERRADO")]
    Cerrado,
}

/// Cash-desk session bounded by open/close events.
///
/// At most one ABIERTO cuadre exists at any time; every invoice settled
/// while it is open is attributed to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Cuadre {
    pub id: i64,
    pub opening_user: String,
    pub opened_at: i64,
    pub saldo_inicial: f64,
    pub closing_user: Option<String>,
    pub closed_at: Option<i64>,
    pub estado: CuadreEstado,
    /// Cash counted at close
    pub saldo_real: Option<f64>,
    /// Expenses paid out of the drawer during the session
    pub gastos: f64,
    /// saldo_real - (saldo_inicial + cash totals - gastos), set at close
    pub diferencia: Option<f64>,
    pub observaciones: Option<String>,
}

/// Totals by payment category, derived from the cuadre's invoices
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuadreTotals {
    pub cash: f64,
    pub card: f64,
    pub transfer: f64,
    /// Expected drawer content: saldo_inicial + cash - gastos
    pub total_caja: f64,
}

/// Open cuadre payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuadreOpen {
    pub saldo_inicial: f64,
}

/// Close cuadre payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuadreClose {
    pub saldo_real: f64,
    #[serde(default)]
    pub gastos: f64,
    pub observaciones: Option<String>,
}
