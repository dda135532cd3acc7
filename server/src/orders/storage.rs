//! redb-based storage layer for live orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `snapshots` | `order_id` | `OrderSnapshot` | Live order state |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `table_index` | `table_id` | `order_id` | Exclusive table ownership |
//! | `counters` | name | `u64` | Invoice number counter |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: copy-on-write
//! with an atomic pointer swap, so the file is always consistent even
//! across power loss. The invoice counter lives here so numbers stay
//! strictly increasing across restarts.
//!
//! Settled and closed orders are archived to SQLite and then removed
//! from this store; only live orders are kept here.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use shared::order::OrderSnapshot;

/// Live order snapshots: key = order_id, value = JSON-serialized OrderSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Active order index: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Exclusive table ownership: key = table_id, value = order_id
const TABLE_INDEX_TABLE: TableDefinition<i64, &str> = TableDefinition::new("table_index");

/// Monotonic counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const INVOICE_NUMBER_KEY: &str = "invoice_number";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Live-order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open (or create) the order database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(TABLE_INDEX_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(INVOICE_NUMBER_KEY)?.is_none() {
                counters.insert(INVOICE_NUMBER_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Snapshot Operations ==========

    /// Store a snapshot (within transaction)
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID (read-only)
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a snapshot (after archival)
    pub fn remove_snapshot(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    // ========== Active Order Index ==========

    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    pub fn is_order_active(&self, order_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// All active order snapshots
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        let mut snapshots = Vec::new();
        for result in active_table.iter()? {
            let (key, _) = result?;
            if let Some(value) = snapshots_table.get(key.value())? {
                snapshots.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(snapshots)
    }

    // ========== Table Ownership Index ==========

    /// Owner of a table (within transaction)
    pub fn table_owner_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(TABLE_INDEX_TABLE)?;
        Ok(table.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    /// Owner of a table (read-only)
    pub fn table_owner(&self, table_id: i64) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_INDEX_TABLE)?;
        Ok(table.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    pub fn set_table_owner(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(TABLE_INDEX_TABLE)?;
        table.insert(table_id, order_id)?;
        Ok(())
    }

    pub fn clear_table_owner(&self, txn: &WriteTransaction, table_id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(TABLE_INDEX_TABLE)?;
        table.remove(table_id)?;
        Ok(())
    }

    /// Full occupancy map: (table_id, order_id) pairs
    pub fn table_occupancy(&self) -> StorageResult<Vec<(i64, String)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_INDEX_TABLE)?;
        let mut pairs = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            pairs.push((key.value(), value.value().to_string()));
        }
        Ok(pairs)
    }

    // ========== Invoice Number Counter ==========

    /// Allocate the next invoice number within the caller's transaction.
    ///
    /// The increment commits together with the invoice itself, so
    /// committed invoices always carry strictly increasing numbers.
    pub fn next_invoice_number(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table
            .get(INVOICE_NUMBER_KEY)?
            .map(|g| g.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(INVOICE_NUMBER_KEY, next)?;
        Ok(next as i64)
    }

    /// Current invoice counter value (read-only)
    pub fn current_invoice_number(&self) -> StorageResult<i64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table
            .get(INVOICE_NUMBER_KEY)?
            .map(|g| g.value())
            .unwrap_or(0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::now_millis;

    #[test]
    fn test_snapshot_roundtrip() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let snapshot = OrderSnapshot::new("order-1".to_string(), "Ana".to_string(), now_millis());

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_snapshot("order-1").unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(storage.get_snapshot("missing").unwrap().is_none());
    }

    #[test]
    fn test_table_ownership() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.set_table_owner(&txn, 5, "order-1").unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.table_owner(5).unwrap().as_deref(), Some("order-1"));
        assert_eq!(storage.table_owner(6).unwrap(), None);

        let txn = storage.begin_write().unwrap();
        storage.clear_table_owner(&txn, 5).unwrap();
        txn.commit().unwrap();
        assert_eq!(storage.table_owner(5).unwrap(), None);
    }

    #[test]
    fn test_invoice_counter_monotonic() {
        let storage = OrderStorage::open_in_memory().unwrap();

        for expected in 1..=5 {
            let txn = storage.begin_write().unwrap();
            let n = storage.next_invoice_number(&txn).unwrap();
            txn.commit().unwrap();
            assert_eq!(n, expected);
        }
        assert_eq!(storage.current_invoice_number().unwrap(), 5);
    }

    #[test]
    fn test_aborted_txn_does_not_advance_counter() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let n = storage.next_invoice_number(&txn).unwrap();
        assert_eq!(n, 1);
        drop(txn); // abort

        let txn = storage.begin_write().unwrap();
        let n = storage.next_invoice_number(&txn).unwrap();
        txn.commit().unwrap();
        // 编号 1 被回滚后重新分配，已提交的编号仍严格递增
        assert_eq!(n, 1);
    }

    #[test]
    fn test_invoice_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.redb");
        {
            let storage = OrderStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage.next_invoice_number(&txn).unwrap();
            txn.commit().unwrap();
        }

        let storage = OrderStorage::open(&path).unwrap();
        assert_eq!(storage.current_invoice_number().unwrap(), 1);
        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_invoice_number(&txn).unwrap(), 2);
        txn.commit().unwrap();
    }

    #[test]
    fn test_active_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let snapshot = OrderSnapshot::new("order-1".to_string(), "Ana".to_string(), now_millis());

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        storage.mark_order_active(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert!(storage.is_order_active("order-1").unwrap());
        assert_eq!(storage.get_active_orders().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        storage.mark_order_inactive(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert!(!storage.is_order_active("order-1").unwrap());
        assert!(storage.get_active_orders().unwrap().is_empty());
    }
}
