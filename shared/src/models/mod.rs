//! Domain models
//!
//! Serde DTOs shared between server and clients. Models that are
//! persisted in SQLite derive `sqlx::FromRow` behind the `db` feature.

pub mod cuadre;
pub mod customer;
pub mod dining_table;
pub mod discount;
pub mod invoice;
pub mod payment_method;

pub use cuadre::{Cuadre, CuadreClose, CuadreEstado, CuadreOpen, CuadreTotals};
pub use customer::CustomerSnapshot;
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus, TableView};
pub use discount::Discount;
pub use invoice::{Invoice, InvoiceCreate, InvoiceTotals};
pub use payment_method::{PaymentCategory, PaymentMethod};
