//! Command infrastructure: context, metadata, handler trait, errors
//!
//! Every mutating operation is an action struct implementing
//! [`CommandHandler`]. The manager runs it inside a single redb write
//! transaction: read current state, validate guards, write new state.
//! A failed guard aborts the transaction, so conflicting concurrent
//! writers observe a structured error, never a silent overwrite.

use redb::WriteTransaction;
use thiserror::Error;

use shared::order::{OrderSnapshot, StaffRole};

use super::storage::{OrderStorage, StorageError};

/// Order engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Order is locked: {0}")]
    OrderLocked(String),

    #[error("Order has no table: {0}")]
    MissingTable(String),

    #[error("Table conflict: {0}")]
    TableConflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Insufficient payment: required {required}, tendered {tendered}")]
    InsufficientPayment { required: f64, tendered: f64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<OrderError> for crate::utils::AppError {
    fn from(err: OrderError) -> Self {
        use crate::utils::AppError;
        match err {
            OrderError::OrderNotFound(id) => AppError::NotFound(format!("Order {id} not found")),
            OrderError::ItemNotFound(id) => AppError::NotFound(format!("Item {id} not found")),
            OrderError::OrderLocked(msg) => AppError::OrderLocked(msg),
            OrderError::MissingTable(msg) => AppError::MissingTable(msg),
            OrderError::TableConflict(msg) => AppError::TableConflict(msg),
            OrderError::PermissionDenied(msg) => AppError::Forbidden(msg),
            OrderError::InsufficientPayment { required, tendered } => {
                AppError::InsufficientPayment { required, tendered }
            }
            OrderError::InvalidOperation(msg) => AppError::Validation(msg),
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                AppError::Internal(e.to_string())
            }
        }
    }
}

/// Who is executing the command
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub operator_id: i64,
    pub operator_name: String,
    pub role: StaffRole,
    pub timestamp: i64,
}

/// Transactional view over the order store.
///
/// All reads and writes go through the same write transaction; the
/// commit (or abort) happens in the manager after the action returns.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    now: i64,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, now: i64) -> Self {
        Self { txn, storage, now }
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    /// Load an order snapshot or fail with OrderNotFound
    pub fn load_order(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        self.storage
            .get_snapshot_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Persist a snapshot, bumping its version and updated_at
    pub fn store_order(&self, snapshot: &mut OrderSnapshot) -> Result<(), OrderError> {
        snapshot.version += 1;
        snapshot.updated_at = self.now;
        self.storage.store_snapshot(self.txn, snapshot)?;
        Ok(())
    }

    /// Current owner of a table, if any
    pub fn table_owner(&self, table_id: i64) -> Result<Option<String>, OrderError> {
        Ok(self.storage.table_owner_txn(self.txn, table_id)?)
    }

    /// Assign a table to an order.
    ///
    /// Compare-and-swap semantics: succeeds when the slot is empty or
    /// already holds the same order (idempotent); a slot held by a
    /// different order fails with TableConflict. The read and the
    /// conditional write share this transaction, so a losing concurrent
    /// writer gets the conflict rather than overwriting the winner.
    pub fn assign_table(&self, table_id: i64, order_id: &str) -> Result<(), OrderError> {
        match self.storage.table_owner_txn(self.txn, table_id)? {
            Some(owner) if owner != order_id => Err(OrderError::TableConflict(format!(
                "Table {table_id} is already occupied (order: {owner})"
            ))),
            Some(_) => Ok(()),
            None => {
                self.storage.set_table_owner(self.txn, table_id, order_id)?;
                Ok(())
            }
        }
    }

    /// Release a table only if it is still owned by the given order
    pub fn release_table(&self, table_id: i64, order_id: &str) -> Result<(), OrderError> {
        if let Some(owner) = self.storage.table_owner_txn(self.txn, table_id)?
            && owner == order_id
        {
            self.storage.clear_table_owner(self.txn, table_id)?;
        }
        Ok(())
    }

    pub fn mark_active(&self, order_id: &str) -> Result<(), OrderError> {
        self.storage.mark_order_active(self.txn, order_id)?;
        Ok(())
    }

    pub fn mark_inactive(&self, order_id: &str) -> Result<(), OrderError> {
        self.storage.mark_order_inactive(self.txn, order_id)?;
        Ok(())
    }

    /// Allocate the next invoice number (strictly increasing, crash-safe)
    pub fn next_invoice_number(&self) -> Result<i64, OrderError> {
        Ok(self.storage.next_invoice_number(self.txn)?)
    }
}

/// A validated, transactional state mutation
pub trait CommandHandler {
    type Output;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError>;
}

/// Reject any mutation of a terminal (PAGADO/CERRADO) order
pub fn guard_unlocked(snapshot: &OrderSnapshot) -> Result<(), OrderError> {
    if snapshot.status.is_terminal() {
        return Err(OrderError::OrderLocked(format!(
            "Order {} is {} and can no longer be modified",
            snapshot.order_id,
            snapshot.status.as_str()
        )));
    }
    Ok(())
}
