//! Server-side cart snapshots.
//!
//! A [`CartSnapshot`] is exactly what `GET /cart` returned. It is never
//! patched locally: after every mutation the client fetches a new one.

use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Price;

/// Product summary embedded in cart and order lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub product: Option<LineProduct>,
    /// Flat name some responses carry instead of a nested product.
    #[serde(default)]
    pub name: Option<String>,
    pub qty: u32,
    pub unit_price: Price,
}

impl CartItem {
    /// Name to display for the line.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("Luxury Watch")
    }

    /// `unit_price × qty`, for per-line display only.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.qty)
    }
}

/// The cart as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Server-computed total (may include discounts and taxes).
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub item_count: u32,
}

impl CartSnapshot {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by ID.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
