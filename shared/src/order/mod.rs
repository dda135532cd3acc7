//! Order types
//!
//! - **types**: lifecycle status, staff roles, item inputs, discount snapshots
//! - **snapshot**: the live order snapshot with its item ledger and totals

pub mod snapshot;
pub mod types;

pub use snapshot::{OrderBills, OrderItemSnapshot, OrderSnapshot, PrintRun, PrintRunLine};
pub use types::{
    CustomerChange, DiscountKind, DiscountSnapshot, ItemChanges, ItemInput, OrderStatus, StaffRole,
};
