//! Orders created by checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::LineProduct;
use super::id::OrderId;
use super::price::Price;
use super::status::OrderStatus;

/// How the customer pays on delivery or at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Card,
    Gcash,
    Paymaya,
}

impl PaymentMethod {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Card => "Credit/Debit Card",
            Self::Gcash => "GCash",
            Self::Paymaya => "PayMaya",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "card" => Ok(Self::Card),
            "gcash" => Ok(Self::Gcash),
            "paymaya" => Ok(Self::Paymaya),
            other => Err(format!("invalid payment method: {other}")),
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub product: Option<LineProduct>,
    #[serde(default)]
    pub name: Option<String>,
    pub qty: u32,
    pub unit_price: Price,
}

impl OrderItem {
    /// Name to display for the line.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.product.as_ref().and_then(|p| p.name.as_deref()))
            .unwrap_or("Luxury Watch")
    }

    /// Brand to display for the line.
    #[must_use]
    pub fn brand(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.brand.as_deref())
            .unwrap_or("Luxury Watch")
    }
}

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Price,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub delivery_name: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_city: Option<String>,
    #[serde(default)]
    pub item_count: Option<u32>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Number of pieces, preferring the server count.
    #[must_use]
    pub fn pieces(&self) -> u32 {
        self.item_count
            .unwrap_or_else(|| self.items.iter().map(|item| item.qty).sum())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_api() {
        let json = r#"{
            "id": 1042,
            "status": "processing",
            "total": "1250000.00",
            "payment_method": "gcash",
            "delivery_name": "Juan Dela Cruz",
            "items": [{"id": 1, "name": "Nautilus", "qty": 1, "unit_price": 1250000}],
            "created_at": "2025-03-14T09:30:00.000000Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(1042));
        assert_eq!(order.payment_method.label(), "GCash");
        assert_eq!(order.pieces(), 1);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("PayMaya".parse::<PaymentMethod>(), Ok(PaymentMethod::Paymaya));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
