//! Pricing & tax engine

pub mod engine;

pub use engine::{Priced, PricingError, discount_from_record, price_item};
