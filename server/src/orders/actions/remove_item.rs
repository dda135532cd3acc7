//! RemoveItem command handler

use shared::order::OrderSnapshot;

use super::guard_removal;
use crate::orders::money;
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// RemoveItem action
#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub order_id: String,
    pub item_id: String,
}

impl CommandHandler for RemoveItemAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;
        guard_removal(snapshot.status, metadata.role)?;

        let before = snapshot.items.len();
        snapshot.items.retain(|i| i.id != self.item_id);
        if snapshot.items.len() == before {
            return Err(OrderError::ItemNotFound(self.item_id.clone()));
        }

        money::recalculate_totals(&mut snapshot);
        ctx.store_order(&mut snapshot)?;

        Ok(snapshot)
    }
}
