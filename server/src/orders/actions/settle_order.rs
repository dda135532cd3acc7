//! SettleOrder command handler - invoice issuance
//!
//! The only path into PAGADO. Validates billability, computes tip and
//! change, allocates the strictly increasing invoice number, freezes
//! the invoice onto the snapshot, releases the table and deactivates
//! the order - all in one transaction. Attribution to the open cuadre
//! is resolved by the caller before this action runs.

use rust_decimal::Decimal;

use shared::models::{CustomerSnapshot, Invoice, InvoiceTotals, PaymentCategory};
use shared::order::{OrderSnapshot, OrderStatus};
use shared::util::new_id;

use crate::orders::money::{to_decimal, to_f64};
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, guard_unlocked,
};

/// SettleOrder action
#[derive(Debug, Clone)]
pub struct SettleOrderAction {
    pub order_id: String,
    pub payment_method_id: i64,
    pub payment_method_name: String,
    pub payment_category: PaymentCategory,
    pub cash_amount: Option<f64>,
    pub tip_amount: f64,
    /// Customer supplied at payment time; falls back to the order's
    pub customer: Option<CustomerSnapshot>,
    /// The currently ABIERTO cuadre this sale belongs to
    pub cuadre_id: i64,
}

impl CommandHandler for SettleOrderAction {
    type Output = (OrderSnapshot, Invoice);

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError> {
        // 1. Settlement is a status mutation: Admin/Cashier only
        if !metadata.role.can_change_status() {
            return Err(OrderError::PermissionDenied(
                "Only admin or cashier can settle an order".to_string(),
            ));
        }

        let mut snapshot = ctx.load_order(&self.order_id)?;
        guard_unlocked(&snapshot)?;

        // 2. Billability guards
        if snapshot.items.is_empty() {
            return Err(OrderError::InvalidOperation(format!(
                "Order {} has no items to invoice",
                snapshot.order_id
            )));
        }
        if snapshot.invoice.is_some() {
            return Err(OrderError::InvalidOperation(format!(
                "Order {} is already invoiced",
                snapshot.order_id
            )));
        }

        // 3. Tip is added after tax and is itself untaxed
        if !self.tip_amount.is_finite() || self.tip_amount < 0.0 {
            return Err(OrderError::InvalidOperation(format!(
                "tipAmount must be non-negative, got {}",
                self.tip_amount
            )));
        }
        let tip = to_decimal(self.tip_amount);
        let amount_due = to_decimal(snapshot.bills.total) + tip;

        // 4. Cash handling: tendered amount must cover total + tip
        let (cash_amount, change) = match self.payment_category {
            PaymentCategory::Cash => {
                let tendered_f = self.cash_amount.ok_or_else(|| {
                    OrderError::InvalidOperation(
                        "cashAmount is required for cash payments".to_string(),
                    )
                })?;
                if !tendered_f.is_finite() || tendered_f < 0.0 {
                    return Err(OrderError::InvalidOperation(format!(
                        "cashAmount must be non-negative, got {tendered_f}"
                    )));
                }
                let tendered = to_decimal(tendered_f);
                if tendered < amount_due {
                    return Err(OrderError::InsufficientPayment {
                        required: to_f64(amount_due),
                        tendered: tendered_f,
                    });
                }
                (Some(tendered_f), (tendered - amount_due).max(Decimal::ZERO))
            }
            _ => (None, Decimal::ZERO),
        };

        // 5. Freeze the invoice
        let invoice = Invoice {
            id: new_id(),
            order_id: snapshot.order_id.clone(),
            invoice_number: ctx.next_invoice_number()?,
            payment_method_id: self.payment_method_id,
            payment_method_name: self.payment_method_name.clone(),
            payment_category: self.payment_category.as_str().to_string(),
            totals: InvoiceTotals {
                subtotal: snapshot.bills.subtotal,
                tax: snapshot.bills.tax,
                tip: to_f64(tip),
                total: to_f64(amount_due),
            },
            cash_amount,
            change: to_f64(change),
            customer: self.customer.clone().or_else(|| snapshot.customer.clone()),
            cuadre_id: self.cuadre_id,
            created_at: ctx.now(),
        };

        // 6. PAGADO locks the order and frees its table
        snapshot.invoice = Some(invoice.clone());
        snapshot.status = OrderStatus::Pagado;
        if let Some(table_id) = snapshot.table_id {
            ctx.release_table(table_id, &snapshot.order_id)?;
        }
        ctx.mark_inactive(&snapshot.order_id)?;
        ctx.store_order(&mut snapshot)?;

        Ok((snapshot, invoice))
    }
}
