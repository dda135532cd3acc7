//! Order actions - one validated, transactional mutation per file
//!
//! - **open_order**: create an order (optionally with items and a table)
//! - **add_item**: append a priced line to an order's ledger
//! - **update_item**: quantity/note changes (quantity ≤ 0 removes)
//! - **remove_item**: role-gated line removal
//! - **move_item**: transfer a line to another table's order
//! - **update_status**: the order state machine
//! - **set_customer**: attach/clear the customer snapshot
//! - **mark_printed**: kitchen ticket accounting
//! - **settle_order**: invoice issuance (the only path into PAGADO)

pub mod add_item;
pub mod mark_printed;
pub mod move_item;
pub mod open_order;
pub mod remove_item;
pub mod set_customer;
pub mod settle_order;
pub mod update_item;
pub mod update_status;

pub use add_item::AddItemAction;
pub use mark_printed::MarkPrintedAction;
pub use move_item::{MoveItemAction, MoveOutcome};
pub use open_order::OpenOrderAction;
pub use remove_item::RemoveItemAction;
pub use set_customer::SetCustomerAction;
pub use settle_order::SettleOrderAction;
pub use update_item::UpdateItemAction;
pub use update_status::UpdateStatusAction;

use shared::order::{ItemInput, OrderItemSnapshot, OrderSnapshot, OrderStatus, StaffRole};
use shared::util::new_id;

use super::money;
use super::traits::{CommandContext, CommandMetadata, OrderError};
use crate::pricing;

/// Price an input and freeze it into a ledger line.
///
/// The pricing engine runs exactly once per line; the resulting unit
/// price is never recomputed from the live catalog.
pub(crate) fn build_item(input: &ItemInput) -> Result<OrderItemSnapshot, OrderError> {
    money::validate_item_input(input)?;

    let base_gross = input.original_price.unwrap_or(input.price);
    let priced = pricing::price_item(base_gross, input.tax_rate, input.discount.as_ref())?;

    Ok(OrderItemSnapshot {
        id: new_id(),
        product_id: input.product_id,
        base_product_id: input.base_product_id,
        name: input.name.trim().to_string(),
        quantity: input.quantity,
        unit_price: priced.unit_price,
        original_price: base_gross,
        line_total: 0.0, // set by recalculate_totals
        tax_rate: input.tax_rate,
        discount: input.discount.clone(),
        note: input.note.clone(),
        printed_qty: 0,
    })
}

/// Resolve the live order owning `table_id`, creating an empty
/// POR_APROBAR shell when the table is free. Idempotent: calling it
/// twice for the same table yields the same order.
pub(crate) fn get_or_create_active_order(
    ctx: &mut CommandContext<'_>,
    table_id: i64,
    metadata: &CommandMetadata,
) -> Result<OrderSnapshot, OrderError> {
    if let Some(order_id) = ctx.table_owner(table_id)? {
        return ctx.load_order(&order_id);
    }

    let mut snapshot = OrderSnapshot::new(new_id(), metadata.operator_name.clone(), ctx.now());
    snapshot.table_id = Some(table_id);
    ctx.assign_table(table_id, &snapshot.order_id)?;
    ctx.mark_active(&snapshot.order_id)?;
    ctx.store_order(&mut snapshot)?;
    Ok(snapshot)
}

/// Removal guard: any role may remove lines from an unconfirmed order;
/// once the order left POR_APROBAR only an Admin may.
pub(crate) fn guard_removal(status: OrderStatus, role: StaffRole) -> Result<(), OrderError> {
    if status == OrderStatus::PorAprobar || role.is_admin() {
        Ok(())
    } else {
        Err(OrderError::PermissionDenied(
            "Only an admin can remove items from a confirmed order".to_string(),
        ))
    }
}
