//! AddItem command handler
//!
//! Appends one priced line to an order's ledger and recomputes totals
//! in the same transaction.

use shared::order::{ItemInput, OrderSnapshot};

use super::build_item;
use crate::orders::money;
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// AddItem action
#[derive(Debug, Clone)]
pub struct AddItemAction {
    pub order_id: String,
    pub input: ItemInput,
}

impl CommandHandler for AddItemAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        snapshot.items.push(build_item(&self.input)?);
        money::recalculate_totals(&mut snapshot);
        ctx.store_order(&mut snapshot)?;

        Ok(snapshot)
    }
}
