//! MoveItem command handler
//!
//! Transfers one ledger line to the destination table's active order,
//! creating that order when the table is free. Both orders are
//! recomputed and persisted inside the same transaction, so the item
//! count across source and destination is conserved even if the process
//! dies mid-move.

use shared::order::OrderSnapshot;

use super::get_or_create_active_order;
use crate::orders::money;
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// Result of a move: both touched orders
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub source: OrderSnapshot,
    pub destination: OrderSnapshot,
}

/// MoveItem action
#[derive(Debug, Clone)]
pub struct MoveItemAction {
    pub order_id: String,
    pub item_id: String,
    pub target_table_id: i64,
}

impl CommandHandler for MoveItemAction {
    type Output = MoveOutcome;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        // 1. Load source and check it is still mutable
        let mut source = ctx.load_order(&self.order_id)?;
        guard_unlocked(&source)?;

        let item_pos = source
            .items
            .iter()
            .position(|i| i.id == self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        // 2. Moving to the table the order already owns is a no-op
        if source.table_id == Some(self.target_table_id) {
            return Ok(MoveOutcome {
                destination: source.clone(),
                source,
            });
        }

        // 3. Resolve or create the destination order (idempotent)
        let mut destination = get_or_create_active_order(ctx, self.target_table_id, metadata)?;
        guard_unlocked(&destination)?;

        // 4. Transfer the record by reference - same item id, never a copy
        let item = source.items.remove(item_pos);
        destination.items.push(item);

        // 5. Recompute and persist both sides atomically
        money::recalculate_totals(&mut source);
        money::recalculate_totals(&mut destination);
        ctx.store_order(&mut source)?;
        ctx.store_order(&mut destination)?;

        Ok(MoveOutcome {
            source,
            destination,
        })
    }
}
