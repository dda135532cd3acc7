//! UpdateStatus command handler - the order state machine
//!
//! ```text
//! POR_APROBAR → PENDIENTE ↔ LISTO → ENTREGADO → CERRADO (admin)
//!     any non-terminal ─────────────────────────→ CERRADO (admin)
//! ```
//!
//! PAGADO is not reachable here: only invoice issuance sets it.
//! Entering PENDIENTE/LISTO requires a resolved table; the first
//! successful entry claims it (Booked). Terminal transitions release
//! the table.

use shared::order::{OrderSnapshot, OrderStatus};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// UpdateStatus action
#[derive(Debug, Clone)]
pub struct UpdateStatusAction {
    pub order_id: String,
    pub status: OrderStatus,
    /// Table supplied in the same call, for orders that have none yet
    pub table_id: Option<i64>,
}

impl CommandHandler for UpdateStatusAction {
    type Output = OrderSnapshot;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        // 1. Role gate: only Admin/Cashier drive the state machine
        if !metadata.role.can_change_status() {
            return Err(OrderError::PermissionDenied(
                "Only admin or cashier can change order status".to_string(),
            ));
        }

        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        // 2. Idempotent: re-applying the current status changes nothing
        if snapshot.status == self.status {
            return Ok(snapshot);
        }

        // 3. Validate the edge
        let from = snapshot.status;
        let allowed = match (from, self.status) {
            (_, OrderStatus::Pagado) => {
                return Err(OrderError::InvalidOperation(
                    "PAGADO is reached only through invoice issuance".to_string(),
                ));
            }
            (_, OrderStatus::Cerrado) => {
                if !metadata.role.is_admin() {
                    return Err(OrderError::PermissionDenied(
                        "Only an admin can close an order".to_string(),
                    ));
                }
                true
            }
            (OrderStatus::PorAprobar, OrderStatus::Pendiente) => true,
            (OrderStatus::Pendiente, OrderStatus::Listo) => true,
            (OrderStatus::Listo, OrderStatus::Pendiente) => true,
            (OrderStatus::Listo, OrderStatus::Entregado) => true,
            _ => false,
        };
        if !allowed {
            return Err(OrderError::InvalidOperation(format!(
                "Invalid status transition {} → {}",
                from.as_str(),
                self.status.as_str()
            )));
        }

        // 4. Table linkage guard for kitchen-bound statuses
        if matches!(self.status, OrderStatus::Pendiente | OrderStatus::Listo) {
            match (snapshot.table_id, self.table_id) {
                (None, None) => {
                    return Err(OrderError::MissingTable(format!(
                        "Order {} needs a table before entering {}",
                        snapshot.order_id,
                        self.status.as_str()
                    )));
                }
                // Claim (or re-claim) the supplied table
                (current, Some(table_id)) if current != Some(table_id) => {
                    ctx.assign_table(table_id, &snapshot.order_id)?;
                    if let Some(old) = current {
                        ctx.release_table(old, &snapshot.order_id)?;
                    }
                    snapshot.table_id = Some(table_id);
                }
                _ => {}
            }
        }

        snapshot.status = self.status;

        // 5. Terminal close: free the table, leave the live index
        if self.status == OrderStatus::Cerrado {
            if let Some(table_id) = snapshot.table_id {
                ctx.release_table(table_id, &snapshot.order_id)?;
            }
            ctx.mark_inactive(&snapshot.order_id)?;
        }

        ctx.store_order(&mut snapshot)?;
        Ok(snapshot)
    }
}
