//! Cart operations against the API.
//!
//! The server owns the cart. Every mutation is followed by a fetch and the
//! fetched snapshot is what callers get back; nothing here predicts what the
//! cart will contain after a change.

use relux_core::cart::checkout_blockers;
use relux_core::{AuthToken, CartItemId, CartSnapshot, DeliveryForm, Order, Product};
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Cart client bound to one API.
#[derive(Clone)]
pub struct CartClient {
    api: ApiClient,
}

impl CartClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the current cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` without a network call when no
    /// token is available, or the API error.
    pub async fn fetch(&self, token: Option<&AuthToken>) -> Result<CartSnapshot> {
        let token = token.ok_or(ClientError::Unauthenticated)?;
        Ok(self.api.cart(token).await?)
    }

    /// Add `qty` of `product`, then re-fetch.
    ///
    /// # Errors
    ///
    /// Rejects a zero quantity, a sold-out product or a missing token before
    /// any network call.
    #[instrument(skip(self, token, product), fields(product_id = %product.id))]
    pub async fn add(
        &self,
        token: Option<&AuthToken>,
        product: &Product,
        qty: u32,
    ) -> Result<CartSnapshot> {
        let token = token.ok_or(ClientError::Unauthenticated)?;
        if qty == 0 {
            return Err(ClientError::InvalidQuantity(0));
        }
        if !product.is_purchasable() {
            return Err(ClientError::SoldOut(product.name.clone()));
        }

        self.api.add_cart_item(token, product.id, qty).await?;
        info!(qty, "Added to cart");
        self.fetch(Some(token)).await
    }

    /// Set the quantity of a line, then re-fetch.
    ///
    /// # Errors
    ///
    /// Quantities below 1 are rejected without a network call; removing a
    /// line is a separate operation.
    #[instrument(skip(self, token))]
    pub async fn update_quantity(
        &self,
        token: Option<&AuthToken>,
        item: CartItemId,
        qty: i64,
    ) -> Result<CartSnapshot> {
        let token = token.ok_or(ClientError::Unauthenticated)?;
        let qty = u32::try_from(qty)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(ClientError::InvalidQuantity(qty))?;

        self.api.update_cart_item(token, item, qty).await?;
        self.fetch(Some(token)).await
    }

    /// Remove a line, then re-fetch.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` without a network call when no
    /// token is available, or the API error.
    #[instrument(skip(self, token))]
    pub async fn remove(&self, token: Option<&AuthToken>, item: CartItemId) -> Result<CartSnapshot> {
        let token = token.ok_or(ClientError::Unauthenticated)?;
        self.api.remove_cart_item(token, item).await?;
        self.fetch(Some(token)).await
    }

    /// Place an order.
    ///
    /// The form is validated first, then the cart is checked against `known`
    /// (or a fresh fetch when nothing is known yet). Only then is the order
    /// posted.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` or `ClientError::EmptyCart` without
    /// posting anything, or the API error.
    #[instrument(skip_all, fields(payment = %form.payment_method.label()))]
    pub async fn checkout(
        &self,
        token: Option<&AuthToken>,
        form: &DeliveryForm,
        known: Option<&CartSnapshot>,
    ) -> Result<Order> {
        let token = token.ok_or(ClientError::Unauthenticated)?;
        form.validate()?;

        let fetched;
        let cart = match known {
            Some(cart) => cart,
            None => {
                fetched = self.api.cart(token).await?;
                &fetched
            }
        };
        checkout_blockers(form, Some(cart))?;

        let order = self.api.checkout(token, form).await?;
        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }
}
