//! Catalog products and paginated listings.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Stock level below which a product is shown as limited.
pub const LIMITED_STOCK_THRESHOLD: i64 = 5;

/// A watch in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Stock badge shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock,
    /// Fewer than five pieces left.
    Limited(i64),
    SoldOut,
}

impl Product {
    /// Availability derived from the stock count.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        if self.stock <= 0 {
            Availability::SoldOut
        } else if self.stock < LIMITED_STOCK_THRESHOLD {
            Availability::Limited(self.stock)
        } else {
            Availability::InStock
        }
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        !matches!(self.availability(), Availability::SoldOut)
    }
}

/// One page of `/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ProductPage {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Submariner".to_string(),
            brand: Some("Relox".to_string()),
            price: Price::from_centavos(1_000_000),
            stock,
            image: None,
            description: None,
        }
    }

    #[test]
    fn test_availability_thresholds() {
        assert_eq!(product(0).availability(), Availability::SoldOut);
        assert_eq!(product(-1).availability(), Availability::SoldOut);
        assert_eq!(product(4).availability(), Availability::Limited(4));
        assert_eq!(product(5).availability(), Availability::InStock);
        assert!(!product(0).is_purchasable());
    }

    #[test]
    fn test_page_deserializes_api_shape() {
        let json = r#"{
            "data": [{"id": 9, "name": "Seamaster", "brand": "Omega", "price": "350000.00", "stock": 3}],
            "current_page": 1,
            "last_page": 2,
            "per_page": 50
        }"#;
        let page: ProductPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }
}
