//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic goes through `Decimal` and is converted back
//! to `f64` only for storage/serialization. Prices are tax-inclusive
//! integer pesos: unit prices are whole numbers, and the order-level tax
//! is rounded to whole pesos exactly once per recomputation.

use rust_decimal::prelude::*;

use shared::order::{ItemChanges, ItemInput, OrderSnapshot};

use super::traits::OrderError;

/// Rounding for intermediate monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 100_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i64 = 9999;
/// Maximum allowed tax percentage
const MAX_TAX_RATE: f64 = 100.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round to whole pesos (half away from zero)
#[inline]
pub fn round_peso(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidOperation(format!(
            "{field_name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate an ItemInput before processing
pub fn validate_item_input(item: &ItemInput) -> Result<(), OrderError> {
    require_finite(item.price, "price")?;
    if item.price < 0.0 {
        return Err(OrderError::InvalidOperation(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(OrderError::InvalidOperation(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {}",
            item.price
        )));
    }

    if let Some(op) = item.original_price {
        require_finite(op, "originalPrice")?;
        if !(0.0..=MAX_PRICE).contains(&op) {
            return Err(OrderError::InvalidOperation(format!(
                "originalPrice out of range, got {op}"
            )));
        }
    }

    require_finite(item.tax_rate, "taxRate")?;
    if !(0.0..=MAX_TAX_RATE).contains(&item.tax_rate) {
        return Err(OrderError::InvalidOperation(format!(
            "taxRate must be between 0 and {MAX_TAX_RATE}, got {}",
            item.tax_rate
        )));
    }

    if item.quantity <= 0 {
        return Err(OrderError::InvalidOperation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidOperation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
            item.quantity
        )));
    }

    if item.name.trim().is_empty() {
        return Err(OrderError::InvalidOperation(
            "item name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate item changes (from the update-item endpoint)
pub fn validate_item_changes(changes: &ItemChanges) -> Result<(), OrderError> {
    if let Some(q) = changes.quantity
        && q > MAX_QUANTITY
    {
        return Err(OrderError::InvalidOperation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {q}"
        )));
    }
    Ok(())
}

/// Recalculate order totals from the item ledger.
///
/// Unit prices are tax-inclusive snapshots, so:
/// - `total   = Σ unit_price × quantity`
/// - `tax     = round₀( Σ line_gross × rate / (100 + rate) )`
/// - `subtotal = total − tax`
///
/// The derived invariant `total == subtotal + tax` therefore holds by
/// construction after every call. Also refreshes each item's
/// `line_total`. Runs inside the same transaction as the mutation that
/// triggered it - stale totals are never observable.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    let mut total = Decimal::ZERO;
    let mut tax_raw = Decimal::ZERO;

    for item in &mut snapshot.items {
        let quantity = Decimal::from(item.quantity);
        let unit_price = to_decimal(item.unit_price);
        let line_gross = unit_price * quantity;
        item.line_total = to_f64(line_gross);

        total += line_gross;

        // Tax share of a tax-inclusive price: gross * rate / (100 + rate)
        let rate = to_decimal(item.tax_rate);
        if rate > Decimal::ZERO {
            tax_raw += line_gross * rate / (Decimal::ONE_HUNDRED + rate);
        }
    }

    let tax = round_peso(tax_raw);
    let subtotal = (total - tax).max(Decimal::ZERO);

    snapshot.bills.total = to_f64(total);
    snapshot.bills.tax = to_f64(tax);
    snapshot.bills.subtotal = to_f64(subtotal);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderItemSnapshot, OrderStatus};
    use shared::util::now_millis;

    fn test_item(id: &str, unit_price: f64, quantity: i64, tax_rate: f64) -> OrderItemSnapshot {
        OrderItemSnapshot {
            id: id.to_string(),
            product_id: 1,
            base_product_id: None,
            name: "Item".to_string(),
            quantity,
            unit_price,
            original_price: unit_price,
            line_total: 0.0,
            tax_rate,
            discount: None,
            note: None,
            printed_qty: 0,
        }
    }

    fn snapshot_with(items: Vec<OrderItemSnapshot>) -> OrderSnapshot {
        let mut s = OrderSnapshot::new("order-1".to_string(), "Ana".to_string(), now_millis());
        s.status = OrderStatus::PorAprobar;
        s.items = items;
        s
    }

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_totals_invariant_holds() {
        let mut s = snapshot_with(vec![
            test_item("i1", 10000.0, 2, 8.0),
            test_item("i2", 3500.0, 1, 19.0),
            test_item("i3", 2000.0, 3, 0.0),
        ]);
        recalculate_totals(&mut s);

        assert_eq!(s.bills.total, 29500.0);
        assert_eq!(s.bills.total, s.bills.subtotal + s.bills.tax);
        assert_eq!(s.items[0].line_total, 20000.0);
    }

    #[test]
    fn test_tax_extraction_from_inclusive_price() {
        // 10800 gross at 8% → net 10000, tax 800
        let mut s = snapshot_with(vec![test_item("i1", 10800.0, 1, 8.0)]);
        recalculate_totals(&mut s);

        assert_eq!(s.bills.total, 10800.0);
        assert_eq!(s.bills.tax, 800.0);
        assert_eq!(s.bills.subtotal, 10000.0);
    }

    #[test]
    fn test_tax_rounded_once_at_order_level() {
        // Two lines of 10000 at 19%: per-line tax 1596.64, summed then rounded
        let mut s = snapshot_with(vec![
            test_item("i1", 10000.0, 1, 19.0),
            test_item("i2", 10000.0, 1, 19.0),
        ]);
        recalculate_totals(&mut s);

        // 20000 * 19/119 = 3193.277... → 3193
        assert_eq!(s.bills.tax, 3193.0);
        assert_eq!(s.bills.subtotal, 16807.0);
        assert_eq!(s.bills.total, s.bills.subtotal + s.bills.tax);
    }

    #[test]
    fn test_zero_rate_has_no_tax() {
        let mut s = snapshot_with(vec![test_item("i1", 5000.0, 4, 0.0)]);
        recalculate_totals(&mut s);

        assert_eq!(s.bills.total, 20000.0);
        assert_eq!(s.bills.tax, 0.0);
        assert_eq!(s.bills.subtotal, 20000.0);
    }

    #[test]
    fn test_empty_order_zeroes_totals() {
        let mut s = snapshot_with(vec![test_item("i1", 5000.0, 1, 19.0)]);
        recalculate_totals(&mut s);
        assert!(s.bills.total > 0.0);

        s.items.clear();
        recalculate_totals(&mut s);
        assert_eq!(s.bills.total, 0.0);
        assert_eq!(s.bills.tax, 0.0);
        assert_eq!(s.bills.subtotal, 0.0);
    }

    #[test]
    fn test_validate_item_input_bounds() {
        let mut input = ItemInput {
            product_id: 1,
            base_product_id: None,
            name: "Pandebono".to_string(),
            price: 3000.0,
            original_price: None,
            tax_rate: 8.0,
            discount: None,
            quantity: 1,
            note: None,
        };
        assert!(validate_item_input(&input).is_ok());

        input.price = f64::NAN;
        assert!(validate_item_input(&input).is_err());

        input.price = -1.0;
        assert!(validate_item_input(&input).is_err());

        input.price = 3000.0;
        input.quantity = 0;
        assert!(validate_item_input(&input).is_err());

        input.quantity = MAX_QUANTITY + 1;
        assert!(validate_item_input(&input).is_err());

        input.quantity = 1;
        input.tax_rate = 101.0;
        assert!(validate_item_input(&input).is_err());

        input.tax_rate = 8.0;
        input.name = "  ".to_string();
        assert!(validate_item_input(&input).is_err());
    }
}
