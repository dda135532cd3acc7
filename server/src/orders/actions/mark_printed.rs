//! MarkPrinted command handler - kitchen ticket accounting
//!
//! Sets `printed_qty = quantity` for the given lines and appends a
//! monotonic print run to the order's audit trail. Printing a
//! POR_APROBAR order confirms it to PENDIENTE first (which is why a
//! table must already be resolved). The physical print itself is
//! fire-and-forget on the terminal: a failed printer never rolls back
//! a committed run.

use shared::order::{OrderSnapshot, OrderStatus, PrintRun, PrintRunLine};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// MarkPrinted action
#[derive(Debug, Clone)]
pub struct MarkPrintedAction {
    pub order_id: String,
    pub item_ids: Vec<String>,
}

impl CommandHandler for MarkPrintedAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        if self.item_ids.is_empty() {
            return Err(OrderError::InvalidOperation(
                "No items given to mark as printed".to_string(),
            ));
        }

        // 1. A kitchen ticket implicitly confirms an unapproved order
        if snapshot.status == OrderStatus::PorAprobar {
            if snapshot.table_id.is_none() {
                return Err(OrderError::MissingTable(format!(
                    "Order {} needs a table before its comanda can be printed",
                    snapshot.order_id
                )));
            }
            snapshot.status = OrderStatus::Pendiente;
        }

        // 2. Record what actually went to the kitchen this run
        let mut lines = Vec::new();
        for item_id in &self.item_ids {
            let item = snapshot
                .find_item_mut(item_id)
                .ok_or_else(|| OrderError::ItemNotFound(item_id.clone()))?;
            let pending = item.pending_print();
            if pending > 0 {
                lines.push(PrintRunLine {
                    item_id: item.id.clone(),
                    quantity: pending,
                });
                item.printed_qty = item.quantity;
            }
        }

        if lines.is_empty() {
            return Err(OrderError::InvalidOperation(
                "No pending quantities to print".to_string(),
            ));
        }

        let run = PrintRun {
            run: snapshot.next_print_run(),
            lines,
            operator_name: metadata.operator_name.clone(),
            printed_at: ctx.now(),
        };
        snapshot.print_runs.push(run);

        ctx.store_order(&mut snapshot)?;
        Ok(snapshot)
    }
}
