//! SetCustomer command handler
//!
//! Attaches an ad-hoc customer snapshot, links a registered user, or
//! clears the customer from the order.

use shared::order::{CustomerChange, OrderSnapshot};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// SetCustomer action
#[derive(Debug, Clone)]
pub struct SetCustomerAction {
    pub order_id: String,
    pub change: CustomerChange,
}

impl CommandHandler for SetCustomerAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        snapshot.customer = self.change.clone().into_snapshot();
        ctx.store_order(&mut snapshot)?;

        Ok(snapshot)
    }
}
