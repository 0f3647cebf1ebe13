//! Checkout and order history against the mock API.

#![allow(clippy::unwrap_used)]

use relux_core::{
    DeliveryForm, LoginForm, OrderId, OrderStatus, Overlay, PaymentMethod, ProductId,
};
use relux_integration_tests::{
    CART, CHECKOUT, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, MockApi, ORDER, ORDERS, PRODUCTS,
};
use relux_storefront::{ClientError, Storefront};
use secrecy::SecretString;
use tempfile::TempDir;

const SPEEDMASTER: ProductId = ProductId::new(3);

fn delivery() -> DeliveryForm {
    DeliveryForm {
        delivery_name: "Maria Clara".to_string(),
        delivery_phone: "0917 555 0101".to_string(),
        delivery_address: "6750 Ayala Avenue".to_string(),
        delivery_city: "Makati".to_string(),
        delivery_postal_code: "1226".to_string(),
        delivery_notes: "Leave with the concierge".to_string(),
        payment_method: PaymentMethod::Gcash,
    }
}

async fn signed_in(api: &MockApi, dir: &TempDir) -> Storefront {
    let config = api.config(dir.path()).unwrap();
    let mut app = Storefront::from_config(&config).unwrap();
    app.start("#shop").await.unwrap();
    app.login(&LoginForm {
        email: CUSTOMER_EMAIL.to_string(),
        password: SecretString::from(CUSTOMER_PASSWORD.to_string()),
    })
    .await
    .unwrap();
    app.drain_notices();
    app
}

async fn with_speedmaster(api: &MockApi, dir: &TempDir) -> Storefront {
    let mut app = signed_in(api, dir).await;
    let product = app.product(SPEEDMASTER).cloned().unwrap();
    app.add_to_cart(&product, 1).await.unwrap();
    app
}

#[tokio::test]
async fn test_place_order() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = with_speedmaster(&api, &dir).await;
    let total = app.state().cart.snapshot().unwrap().total;

    app.request_checkout().await.unwrap();
    assert_eq!(app.state().overlay, Overlay::Checkout);

    let order = app.place_order(&delivery()).await.unwrap();
    assert_eq!(order.total, total);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Gcash);
    assert_eq!(order.pieces(), 1);
    assert_eq!(
        app.state().overlay,
        Overlay::OrderSuccess(Box::new(order.clone()))
    );

    // The cart is re-fetched and is now empty
    assert_eq!(app.state().cart.item_count(), 0);
    assert_eq!(api.stock(SPEEDMASTER), Some(7));

    let orders = app.orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().map(|o| o.id), Some(order.id));

    let detail = app.order(order.id).await.unwrap();
    assert_eq!(detail.delivery_city.as_deref(), Some("Makati"));
    assert_eq!(detail.items.first().map(|i| i.brand()), Some("Omega"));
    assert_eq!(api.hits(ORDERS), 1);
    assert_eq!(api.hits(ORDER), 1);
}

#[tokio::test]
async fn test_order_refreshes_cached_stock() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = with_speedmaster(&api, &dir).await;
    assert_eq!(app.product(SPEEDMASTER).map(|p| p.stock), Some(8));

    app.place_order(&delivery()).await.unwrap();
    let fetched = api.hits(PRODUCTS);
    app.navigate("#about").await.unwrap();
    app.navigate("#shop").await.unwrap();

    assert_eq!(api.hits(PRODUCTS), fetched + 1);
    assert_eq!(app.product(SPEEDMASTER).map(|p| p.stock), Some(7));
}

#[tokio::test]
async fn test_incomplete_delivery_form_is_not_sent() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = with_speedmaster(&api, &dir).await;

    let mut form = delivery();
    form.delivery_city = "  ".to_string();
    form.delivery_phone = String::new();
    let err = app.place_order(&form).await.unwrap_err();

    let fields = err.field_errors().unwrap();
    assert!(fields.get("delivery_city").is_some());
    assert!(fields.get("delivery_phone").is_some());
    assert_eq!(api.hits(CHECKOUT), 0);
    assert_eq!(api.order_count(), 0);
}

#[tokio::test]
async fn test_empty_cart_is_not_sent() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = signed_in(&api, &dir).await;

    let err = app.place_order(&delivery()).await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyCart));
    assert_eq!(api.hits(CHECKOUT), 0);
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = with_speedmaster(&api, &dir).await;
    app.request_checkout().await.unwrap();
    let fetches = api.hits(CART);

    api.fail_next(CHECKOUT, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let err = app.place_order(&delivery()).await.unwrap_err();
    assert_eq!(err.user_message(), "Server Error");
    assert_eq!(app.state().overlay, Overlay::Checkout);
    assert_eq!(app.state().cart.item_count(), 1);
    assert_eq!(api.hits(CART), fetches);
    assert_eq!(api.order_count(), 0);

    // Retrying succeeds
    app.place_order(&delivery()).await.unwrap();
    assert_eq!(api.order_count(), 1);
}

#[tokio::test]
async fn test_unknown_order_is_an_error() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = signed_in(&api, &dir).await;

    let err = app.order(OrderId::new(12_345)).await.unwrap_err();
    assert_eq!(err.user_message(), "Order not found");
    assert!(app.orders().await.unwrap().is_empty());
}
