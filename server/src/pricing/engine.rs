//! Pure price computation for catalog items
//!
//! Catalog prices are tax-inclusive (gross). The two discount kinds are
//! deliberately asymmetric, matching the billing behavior this engine
//! replaces:
//!
//! - PERCENT discounts the tax-exclusive net, then re-grosses, so the
//!   percentage never compounds with the tax.
//! - VALUE is subtracted straight from the gross.
//!
//! The final unit price is rounded to whole pesos exactly once, here,
//! and stored as an immutable snapshot on the order item.

use rust_decimal::prelude::*;
use thiserror::Error;

use shared::models::Discount;
use shared::order::{DiscountKind, DiscountSnapshot};

use crate::orders::money::{round_peso, to_decimal, to_f64};

/// Pricing errors
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid pricing input: {0}")]
    Validation(String),
}

impl From<PricingError> for crate::orders::traits::OrderError {
    fn from(err: PricingError) -> Self {
        Self::InvalidOperation(err.to_string())
    }
}

/// Result of pricing one unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priced {
    /// Discounted gross unit price, whole pesos
    pub unit_price: f64,
    /// Tax-exclusive counterpart of `unit_price` (2 decimals)
    pub unit_net: f64,
    pub tax_rate: f64,
}

fn require_finite(value: f64, field: &str) -> Result<(), PricingError> {
    if !value.is_finite() {
        return Err(PricingError::Validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Split a gross price into its net given a tax percentage
fn net_of(gross: Decimal, rate: Decimal) -> Decimal {
    if rate > Decimal::ZERO {
        gross / (Decimal::ONE + rate / Decimal::ONE_HUNDRED)
    } else {
        gross
    }
}

/// Price one unit of a catalog product, applying an optional discount.
///
/// `base_gross` is the catalog (tax-inclusive) price before discount.
pub fn price_item(
    base_gross: f64,
    tax_rate: f64,
    discount: Option<&DiscountSnapshot>,
) -> Result<Priced, PricingError> {
    require_finite(base_gross, "price")?;
    require_finite(tax_rate, "taxRate")?;
    if base_gross < 0.0 {
        return Err(PricingError::Validation(format!(
            "price must be non-negative, got {base_gross}"
        )));
    }
    if !(0.0..=100.0).contains(&tax_rate) {
        return Err(PricingError::Validation(format!(
            "taxRate must be between 0 and 100, got {tax_rate}"
        )));
    }

    let gross = to_decimal(base_gross);
    let rate = to_decimal(tax_rate);

    let discounted_gross = match discount {
        None => gross,
        Some(d) => {
            require_finite(d.value, "discount value")?;
            match d.kind {
                DiscountKind::Percent => {
                    if !(0.0..=100.0).contains(&d.value) {
                        return Err(PricingError::Validation(format!(
                            "percent discount must be between 0 and 100, got {}",
                            d.value
                        )));
                    }
                    // applied to the net so it does not compound with tax
                    let net = net_of(gross, rate);
                    let discounted_net =
                        (net * (Decimal::ONE - to_decimal(d.value) / Decimal::ONE_HUNDRED))
                            .max(Decimal::ZERO);
                    discounted_net * (Decimal::ONE + rate / Decimal::ONE_HUNDRED)
                }
                DiscountKind::Value => {
                    if d.value < 0.0 {
                        return Err(PricingError::Validation(format!(
                            "value discount must be non-negative, got {}",
                            d.value
                        )));
                    }
                    (gross - to_decimal(d.value)).max(Decimal::ZERO)
                }
            }
        }
    };

    // Single rounding point: everything downstream uses this snapshot
    let unit_price = round_peso(discounted_gross);
    let unit_net = net_of(unit_price, rate);

    Ok(Priced {
        unit_price: to_f64(unit_price),
        unit_net: to_f64(unit_net),
        tax_rate,
    })
}

/// Build the applicable snapshot from a catalog discount record.
///
/// A record must define percent XOR value; anything else is invalid.
pub fn discount_from_record(discount: &Discount) -> Result<DiscountSnapshot, PricingError> {
    let (kind, value) = match (discount.percent, discount.value) {
        (Some(p), None) => (DiscountKind::Percent, p),
        (None, Some(v)) => (DiscountKind::Value, v),
        (Some(_), Some(_)) => {
            return Err(PricingError::Validation(format!(
                "discount {} defines both percent and value",
                discount.id
            )));
        }
        (None, None) => {
            return Err(PricingError::Validation(format!(
                "discount {} defines neither percent nor value",
                discount.id
            )));
        }
    };

    Ok(DiscountSnapshot {
        discount_id: Some(discount.id),
        kind,
        value,
        name: Some(discount.name.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(value: f64) -> DiscountSnapshot {
        DiscountSnapshot {
            discount_id: Some(1),
            kind: DiscountKind::Percent,
            value,
            name: None,
        }
    }

    fn value(value: f64) -> DiscountSnapshot {
        DiscountSnapshot {
            discount_id: Some(2),
            kind: DiscountKind::Value,
            value,
            name: None,
        }
    }

    #[test]
    fn test_no_discount_rounds_gross() {
        let p = price_item(10000.0, 8.0, None).unwrap();
        assert_eq!(p.unit_price, 10000.0);
        assert_eq!(p.unit_net, 9259.26);
        assert_eq!(p.tax_rate, 8.0);
    }

    #[test]
    fn test_percent_discount_applies_to_net() {
        // gross 10000 at 8%: net 9259.26 → 20% off → 7407.41 → re-grossed 8000
        let p = price_item(10000.0, 8.0, Some(&percent(20.0))).unwrap();
        assert_eq!(p.unit_price, 8000.0);
        assert_eq!(p.unit_net, 7407.41);
    }

    #[test]
    fn test_value_discount_applies_to_gross() {
        let p = price_item(10000.0, 8.0, Some(&value(2000.0))).unwrap();
        assert_eq!(p.unit_price, 8000.0);
    }

    #[test]
    fn test_percent_vs_value_differ_at_equal_nominal_figure() {
        // "20" as a percent knocks 2000 off; "20" as a value knocks 20 off
        let p = price_item(10000.0, 8.0, Some(&percent(20.0))).unwrap();
        let v = price_item(10000.0, 8.0, Some(&value(20.0))).unwrap();
        assert_eq!(p.unit_price, 8000.0);
        assert_eq!(v.unit_price, 9980.0);
        assert_ne!(p.unit_price, v.unit_price);
    }

    #[test]
    fn test_percent_without_tax() {
        let p = price_item(5000.0, 0.0, Some(&percent(10.0))).unwrap();
        assert_eq!(p.unit_price, 4500.0);
        assert_eq!(p.unit_net, 4500.0);
    }

    #[test]
    fn test_value_discount_clamps_at_zero() {
        let p = price_item(1500.0, 8.0, Some(&value(2000.0))).unwrap();
        assert_eq!(p.unit_price, 0.0);
    }

    #[test]
    fn test_rounding_happens_once() {
        // gross 9999 at 19%: net 8402.52 → 15% off → 7142.14 → 8499.15 → 8499
        let p = price_item(9999.0, 19.0, Some(&percent(15.0))).unwrap();
        assert_eq!(p.unit_price, 8499.0);
        assert_eq!(p.unit_price.fract(), 0.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(price_item(f64::NAN, 8.0, None).is_err());
        assert!(price_item(-1.0, 8.0, None).is_err());
        assert!(price_item(100.0, -1.0, None).is_err());
        assert!(price_item(100.0, 120.0, None).is_err());
        assert!(price_item(100.0, 8.0, Some(&percent(120.0))).is_err());
        assert!(price_item(100.0, 8.0, Some(&percent(-5.0))).is_err());
        assert!(price_item(100.0, 8.0, Some(&value(-5.0))).is_err());
    }

    #[test]
    fn test_discount_record_percent_xor_value() {
        let mut record = Discount {
            id: 9,
            name: "Promo".to_string(),
            percent: Some(10.0),
            value: None,
            active: true,
            product_ids: vec![1],
            message: None,
        };
        let snap = discount_from_record(&record).unwrap();
        assert_eq!(snap.kind, DiscountKind::Percent);
        assert_eq!(snap.value, 10.0);

        record.value = Some(500.0);
        assert!(discount_from_record(&record).is_err());

        record.percent = None;
        let snap = discount_from_record(&record).unwrap();
        assert_eq!(snap.kind, DiscountKind::Value);

        record.value = None;
        assert!(discount_from_record(&record).is_err());
    }
}
