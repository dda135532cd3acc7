//! Payment Method Model

use serde::{Deserialize, Serialize};

/// Cash-desk aggregation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCategory {
    Cash,
    Card,
    Transfer,
}

impl PaymentCategory {
    /// Parse an explicit category string ("cash" | "card" | "transfer")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Legacy heuristic: infer the category from a free-text method name.
    ///
    /// "efectivo"/"cash" count as cash, "datafono"/"datáfono"/"tarjeta"/"card"
    /// as card, anything else falls back to transfer.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("efectivo") || lower.contains("cash") {
            Self::Cash
        } else if lower.contains("datafono")
            || lower.contains("datáfono")
            || lower.contains("tarjeta")
            || lower.contains("card")
        {
            Self::Card
        } else {
            Self::Transfer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

/// Payment method entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub active: bool,
    /// Explicit category; legacy rows may be NULL, in which case the
    /// name heuristic decides.
    pub category: Option<String>,
}

impl PaymentMethod {
    /// Resolve the aggregation category: the explicit column wins,
    /// otherwise fall back to the name heuristic.
    pub fn resolved_category(&self) -> PaymentCategory {
        self.category
            .as_deref()
            .and_then(PaymentCategory::parse)
            .unwrap_or_else(|| PaymentCategory::from_name(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_heuristic() {
        assert_eq!(PaymentCategory::from_name("Efectivo"), PaymentCategory::Cash);
        assert_eq!(PaymentCategory::from_name("CASH USD"), PaymentCategory::Cash);
        assert_eq!(PaymentCategory::from_name("Datafono"), PaymentCategory::Card);
        assert_eq!(PaymentCategory::from_name("Tarjeta débito"), PaymentCategory::Card);
        assert_eq!(PaymentCategory::from_name("Nequi"), PaymentCategory::Transfer);
        assert_eq!(PaymentCategory::from_name(""), PaymentCategory::Transfer);
    }

    #[test]
    fn test_explicit_category_wins_over_name() {
        let pm = PaymentMethod {
            id: 1,
            name: "Efectivo dólares".to_string(),
            active: true,
            category: Some("transfer".to_string()),
        };
        assert_eq!(pm.resolved_category(), PaymentCategory::Transfer);
    }

    #[test]
    fn test_null_category_falls_back_to_heuristic() {
        let pm = PaymentMethod {
            id: 1,
            name: "Tarjeta crédito".to_string(),
            active: true,
            category: None,
        };
        assert_eq!(pm.resolved_category(), PaymentCategory::Card);
    }
}
