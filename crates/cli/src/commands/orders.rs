//! Order history commands.

use relux_core::{OrderId, Route};
use relux_storefront::StorefrontConfig;

use super::{CommandError, emit, fail, open_storefront};
use crate::render;

/// List orders, or show one.
pub async fn show(config: &StorefrontConfig, id: Option<OrderId>) -> Result<(), CommandError> {
    let mut app = open_storefront(config, Route::Orders.hash()).await?;

    let text = match id {
        Some(id) => app.order(id).await.map(|order| render::order_detail(&order)),
        None => app.orders().await.map(|orders| render::orders(&orders)),
    };
    match text {
        Ok(text) => {
            emit(&text);
            Ok(())
        }
        Err(e) => Err(fail(&mut app, e)),
    }
}
