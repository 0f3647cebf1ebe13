//! Cart and checkout commands.
//!
//! # Usage
//!
//! ```bash
//! relux cart
//! relux cart add 42 --qty 2
//! relux cart set 7 3
//! relux cart remove 7
//! relux checkout --name "Maria Clara" --phone 0917 --address "1 Ayala Ave" \
//!     --city Makati --postal-code 1226
//! ```

use relux_core::{CartItemId, DeliveryForm, ProductId};
use relux_storefront::{ClientError, Storefront, StorefrontConfig};

use super::{CommandError, emit, fail, flush_notices, open_storefront};
use crate::render;

fn show_cart(app: &mut Storefront) {
    emit(&render::cart(&app.state().cart, &app.state().session));
    flush_notices(app);
}

/// Show the cart.
pub async fn show(config: &StorefrontConfig) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    if let Err(e) = app.open_cart().await {
        return Err(fail(&mut app, e));
    }
    show_cart(&mut app);
    Ok(())
}

/// Add a product by ID.
pub async fn add(config: &StorefrontConfig, id: ProductId, qty: u32) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    match app.add_by_id(id, qty).await {
        Ok(Some(product)) => emit(&format!("Added {} x{qty}\n", product.name)),
        Ok(None) => emit(&format!("No product #{id}\n")),
        Err(e) => return Err(fail(&mut app, e)),
    }
    show_cart(&mut app);
    Ok(())
}

/// Set the quantity of a cart line.
pub async fn set(config: &StorefrontConfig, item: CartItemId, qty: i64) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    if let Err(e) = app.update_quantity(item, qty).await {
        return Err(fail(&mut app, e));
    }
    show_cart(&mut app);
    Ok(())
}

/// Remove a cart line.
pub async fn remove(config: &StorefrontConfig, item: CartItemId) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    if let Err(e) = app.remove_item(item).await {
        return Err(fail(&mut app, e));
    }
    show_cart(&mut app);
    Ok(())
}

/// Place an order for the whole cart.
pub async fn checkout(config: &StorefrontConfig, form: DeliveryForm) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    if let Err(e) = app.request_checkout().await {
        return Err(fail(&mut app, e));
    }
    if !app.state().session.is_authenticated() {
        return Err(fail(&mut app, ClientError::Unauthenticated));
    }

    match app.place_order(&form).await {
        Ok(order) => {
            emit(&render::order_success(&order));
            flush_notices(&mut app);
            Ok(())
        }
        Err(e) => Err(fail(&mut app, e)),
    }
}
