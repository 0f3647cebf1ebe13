//! Request and response bodies of the Relux API.
//!
//! Domain types live in `relux-core`; these are the envelopes around them.

use relux_core::{AuthToken, CartItemId, Order, ProductId, UserProfile};
use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

/// Response of `/login` and `/register`.
///
/// Both fields must be present for the response to count as a success.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub token: Option<AuthToken>,
}

/// Body of `POST /cart/items`.
#[derive(Debug, Serialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub qty: u32,
}

/// Body of `PATCH /cart/items/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateItemRequest {
    pub qty: u32,
}

/// Response of `POST /checkout`: usually `{order}`, occasionally the bare
/// order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CheckoutResponse {
    Wrapped { order: Order },
    Bare(Order),
}

impl CheckoutResponse {
    #[must_use]
    pub fn into_order(self) -> Order {
        match self {
            Self::Wrapped { order } | Self::Bare(order) => order,
        }
    }
}

/// Response of `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Response of `GET /orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// Path of a cart line.
pub(crate) fn cart_item_path(id: CartItemId) -> String {
    format!("cart/items/{id}")
}
