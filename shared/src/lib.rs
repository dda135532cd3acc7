//! Shared types for the Comanda order-and-billing core
//!
//! Domain models and order types used by both the server and its
//! terminal clients: dining tables, payment methods, discounts,
//! cuadres (cash-desk sessions), invoices, and the live order
//! snapshot with its item ledger.

pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use message::ChangeNotice;
pub use order::{OrderSnapshot, OrderStatus, StaffRole};
pub use serde::{Deserialize, Serialize};
