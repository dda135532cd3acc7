//! OrdersManager - transactional command execution for live orders
//!
//! Every public method follows the same shape: begin a redb write
//! transaction, run one action (read → validate guards → write), commit.
//! redb is single-writer, so the read-validate-write step is atomic with
//! respect to every other terminal; a command that loses a race observes
//! the winner's committed state and fails with a structured error
//! (TableConflict, OrderLocked, ...) instead of overwriting it.
//!
//! ```text
//! handler → OrdersManager::<op>() → action.execute(ctx) → commit
//!                                        │
//!                                 recalculate_totals
//! ```

use std::collections::HashMap;
use std::path::Path;

use shared::models::CustomerSnapshot;
use shared::order::{
    CustomerChange, ItemChanges, ItemInput, OrderSnapshot, OrderStatus,
};

use super::actions::{
    AddItemAction, MarkPrintedAction, MoveItemAction, MoveOutcome, OpenOrderAction,
    RemoveItemAction, SetCustomerAction, SettleOrderAction, UpdateItemAction, UpdateStatusAction,
    get_or_create_active_order,
};
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::Invoice;

/// Occupancy entry for the table registry view
#[derive(Debug, Clone)]
pub struct TableOccupancy {
    pub order_id: String,
    pub status: OrderStatus,
}

/// Live-order engine
pub struct OrdersManager {
    storage: OrderStorage,
    /// Server instance epoch - unique ID generated on startup, used by
    /// clients to detect restarts and trigger a full resync
    epoch: String,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, OrderError> {
        let storage = OrderStorage::open(db_path)?;
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Ok(Self { storage, epoch })
    }

    /// Create an OrdersManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: OrderStorage) -> Self {
        Self {
            storage,
            epoch: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Run one action inside a single write transaction.
    ///
    /// An Err from the action drops (aborts) the transaction, so failed
    /// guards leave no partial writes behind.
    fn execute<A: CommandHandler>(
        &self,
        action: A,
        metadata: &CommandMetadata,
    ) -> Result<A::Output, OrderError> {
        let txn = self.storage.begin_write()?;
        let mut ctx = CommandContext::new(&txn, &self.storage, metadata.timestamp);
        let output = action.execute(&mut ctx, metadata)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(output)
    }

    // ========== Mutations ==========

    pub fn open_order(
        &self,
        customer: Option<CustomerSnapshot>,
        items: Vec<ItemInput>,
        table_id: Option<i64>,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            OpenOrderAction {
                customer,
                items,
                table_id,
            },
            metadata,
        )
    }

    pub fn add_item(
        &self,
        order_id: &str,
        input: ItemInput,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            AddItemAction {
                order_id: order_id.to_string(),
                input,
            },
            metadata,
        )
    }

    /// Add an item to the table's active order, creating the order when
    /// the table is free - the ledger entry point used by terminals.
    pub fn add_item_to_table(
        &self,
        table_id: i64,
        input: ItemInput,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        let txn = self.storage.begin_write()?;
        let mut ctx = CommandContext::new(&txn, &self.storage, metadata.timestamp);

        let order = get_or_create_active_order(&mut ctx, table_id, metadata)?;
        let action = AddItemAction {
            order_id: order.order_id,
            input,
        };
        let snapshot = action.execute(&mut ctx, metadata)?;

        txn.commit().map_err(StorageError::from)?;
        Ok(snapshot)
    }

    pub fn update_item(
        &self,
        order_id: &str,
        item_id: &str,
        changes: ItemChanges,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            UpdateItemAction {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
                changes,
            },
            metadata,
        )
    }

    pub fn remove_item(
        &self,
        order_id: &str,
        item_id: &str,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            RemoveItemAction {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
            },
            metadata,
        )
    }

    pub fn move_item(
        &self,
        order_id: &str,
        item_id: &str,
        target_table_id: i64,
        metadata: &CommandMetadata,
    ) -> Result<MoveOutcome, OrderError> {
        self.execute(
            MoveItemAction {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
                target_table_id,
            },
            metadata,
        )
    }

    pub fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        table_id: Option<i64>,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            UpdateStatusAction {
                order_id: order_id.to_string(),
                status,
                table_id,
            },
            metadata,
        )
    }

    pub fn set_customer(
        &self,
        order_id: &str,
        change: CustomerChange,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            SetCustomerAction {
                order_id: order_id.to_string(),
                change,
            },
            metadata,
        )
    }

    pub fn mark_printed(
        &self,
        order_id: &str,
        item_ids: Vec<String>,
        metadata: &CommandMetadata,
    ) -> Result<OrderSnapshot, OrderError> {
        self.execute(
            MarkPrintedAction {
                order_id: order_id.to_string(),
                item_ids,
            },
            metadata,
        )
    }

    pub fn settle_order(
        &self,
        action: SettleOrderAction,
        metadata: &CommandMetadata,
    ) -> Result<(OrderSnapshot, Invoice), OrderError> {
        self.execute(action, metadata)
    }

    /// Drop a settled/closed order from the live store once its archive
    /// row is safely in SQLite. A failed archive simply leaves the
    /// snapshot behind for a later retry.
    pub fn purge_archived(&self, order_id: &str) -> Result<(), OrderError> {
        let txn = self.storage.begin_write()?;
        if self.storage.is_order_active(order_id)? {
            return Err(OrderError::InvalidOperation(format!(
                "Order {order_id} is still active"
            )));
        }
        self.storage.remove_snapshot(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: &str) -> Result<Option<OrderSnapshot>, OrderError> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    pub fn list_active(&self) -> Result<Vec<OrderSnapshot>, OrderError> {
        let mut orders = self.storage.get_active_orders()?;
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    /// Active order for a table, if any
    pub fn order_for_table(&self, table_id: i64) -> Result<Option<OrderSnapshot>, OrderError> {
        match self.storage.table_owner(table_id)? {
            Some(order_id) => Ok(self.storage.get_snapshot(&order_id)?),
            None => Ok(None),
        }
    }

    /// Occupancy map for the table registry view
    pub fn table_occupancy(&self) -> Result<HashMap<i64, TableOccupancy>, OrderError> {
        let mut map = HashMap::new();
        for (table_id, order_id) in self.storage.table_occupancy()? {
            if let Some(snapshot) = self.storage.get_snapshot(&order_id)? {
                map.insert(
                    table_id,
                    TableOccupancy {
                        order_id,
                        status: snapshot.status,
                    },
                );
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests;
