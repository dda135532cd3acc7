//! UpdateItem command handler
//!
//! Quantity and note changes. A quantity ≤ 0 behaves as removal and is
//! therefore subject to the same role guard as RemoveItem.

use shared::order::{ItemChanges, OrderSnapshot};

use super::guard_removal;
use crate::orders::money;
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// UpdateItem action
#[derive(Debug, Clone)]
pub struct UpdateItemAction {
    pub order_id: String,
    pub item_id: String,
    pub changes: ItemChanges,
}

impl CommandHandler for UpdateItemAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        money::validate_item_changes(&self.changes)?;

        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        if snapshot.find_item(&self.item_id).is_none() {
            return Err(OrderError::ItemNotFound(self.item_id.clone()));
        }

        match self.changes.quantity {
            // quantity ≤ 0 removes the line
            Some(q) if q <= 0 => {
                guard_removal(snapshot.status, metadata.role)?;
                snapshot.items.retain(|i| i.id != self.item_id);
            }
            quantity => {
                let item = snapshot
                    .find_item_mut(&self.item_id)
                    .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
                if let Some(q) = quantity {
                    item.quantity = q;
                }
                if let Some(note) = &self.changes.note {
                    let trimmed = note.trim();
                    item.note = if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    };
                }
            }
        }

        money::recalculate_totals(&mut snapshot);
        ctx.store_order(&mut snapshot)?;

        Ok(snapshot)
    }
}
