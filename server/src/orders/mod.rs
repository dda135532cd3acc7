//! Live-order engine
//!
//! - **manager**: transactional command execution
//! - **storage**: redb persistence (snapshots, table index, counters)
//! - **actions**: one validated mutation per command
//! - **money**: Decimal totals recomputation
//! - **traits**: command context, metadata, handler trait, errors
//!
//! # Command Flow
//!
//! ```text
//! HTTP handler → OrdersManager → Action (validate + mutate) → commit
//!                                         ↓
//!                                recalculate_totals
//! ```

pub mod actions;
pub mod manager;
pub mod money;
pub mod storage;
pub mod traits;

// Re-exports
pub use manager::{OrdersManager, TableOccupancy};
pub use storage::{OrderStorage, StorageError};
pub use traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
