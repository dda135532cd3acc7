//! OpenOrder command handler
//!
//! Creates a new order in POR_APROBAR, optionally seeding items and
//! claiming a table. Item prices are frozen through the pricing engine.

use shared::models::CustomerSnapshot;
use shared::order::{ItemInput, OrderSnapshot};
use shared::util::new_id;

use super::build_item;
use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};

/// OpenOrder action
#[derive(Debug, Clone)]
pub struct OpenOrderAction {
    pub customer: Option<CustomerSnapshot>,
    pub items: Vec<ItemInput>,
    pub table_id: Option<i64>,
}

impl CommandHandler for OpenOrderAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        // 1. Validate every line before touching state
        for input in &self.items {
            money::validate_item_input(input)?;
        }

        // 2. Build the snapshot
        let mut snapshot =
            OrderSnapshot::new(new_id(), metadata.operator_name.clone(), ctx.now());
        snapshot.customer = self.customer.clone().filter(|c| !c.is_empty());

        // 3. Claim the table, if one was requested (conflict aborts everything)
        if let Some(table_id) = self.table_id {
            ctx.assign_table(table_id, &snapshot.order_id)?;
            snapshot.table_id = Some(table_id);
        }

        // 4. Price and append the seed items
        for input in &self.items {
            snapshot.items.push(build_item(input)?);
        }
        money::recalculate_totals(&mut snapshot);

        // 5. Persist
        ctx.mark_active(&snapshot.order_id)?;
        ctx.store_order(&mut snapshot)?;

        Ok(snapshot)
    }
}
